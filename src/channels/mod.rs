//! Terminal I/O for the chatbot.

pub mod cli;
pub mod sink;

pub use cli::CliChannel;
pub use sink::{OutputSink, Transcript, Typewriter};
