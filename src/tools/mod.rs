//! Tool abstraction for agent capabilities.

pub mod builtin;
pub mod registry;
pub mod server;
pub mod tool;

pub use registry::ToolRegistry;
pub use server::ToolServer;
pub use tool::*;
