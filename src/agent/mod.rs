//! Agent runtime: conversation state and the model/tool loop.

pub mod client;
pub mod message;

pub use client::{AgentClient, AgentOptions, Conversation, ResponseStream};
pub use message::{AgentMessage, ResultMessage, TokenUsage};
