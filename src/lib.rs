//! note-bot: a note-taking chatbot on the Anthropic API, plus a sandbox runner.

pub mod agent;
pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod quotes;
pub mod sandbox;
pub mod store;
pub mod tools;
