//! In-process tool servers.
//!
//! A server groups tools under a name and version. When registered, every
//! tool becomes visible to the model as `mcp__<server>__<tool>`.

use std::sync::Arc;

use crate::tools::tool::Tool;

/// Prefix the agent runtime uses for server-provided tools.
pub const TOOL_NAME_PREFIX: &str = "mcp";

/// Qualified tool name as seen by the model.
pub fn qualified_name(server: &str, tool: &str) -> String {
    format!("{TOOL_NAME_PREFIX}__{server}__{tool}")
}

/// A named group of tools.
#[derive(Clone)]
pub struct ToolServer {
    name: String,
    version: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Qualified names of every tool on this server, in registration order.
    pub fn qualified_names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|tool| qualified_name(&self.name, tool.name()))
            .collect()
    }
}

impl std::fmt::Debug for ToolServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolServer")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .finish()
    }
}
