//! Built-in note-taking tools.

pub mod notes;
pub mod quote;

use std::sync::Arc;

use crate::store::NoteStore;
use crate::tools::server::ToolServer;

pub use notes::{FindNoteTool, SaveNoteTool};
pub use quote::InspirationalQuoteTool;

/// Name of the note tool server.
pub const NOTE_SERVER_NAME: &str = "note_tools";

/// Version of the note tool server.
pub const NOTE_SERVER_VERSION: &str = "1.0.0";

/// Build the `note_tools` server backed by the given store.
pub fn note_server(store: Arc<NoteStore>) -> ToolServer {
    ToolServer::new(NOTE_SERVER_NAME, NOTE_SERVER_VERSION)
        .with_tool(Arc::new(SaveNoteTool::new(Arc::clone(&store))))
        .with_tool(Arc::new(FindNoteTool::new(store)))
        .with_tool(Arc::new(InspirationalQuoteTool))
}
