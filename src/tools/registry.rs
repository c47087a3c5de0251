//! Tool registry for managing available tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::llm::ToolDefinition;
use crate::tools::server::{ToolServer, qualified_name};
use crate::tools::tool::{Tool, ToolError, ToolOutput};

/// Registry of available tools, keyed by qualified name.
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a tool under an explicit name.
    pub async fn register(&self, name: impl Into<String>, tool: Arc<dyn Tool>) {
        let name = name.into();
        if self.tools.write().await.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced an existing tool registration");
        }
        tracing::debug!("Registered tool: {}", name);
    }

    /// Register every tool of a server (sync version for startup).
    pub fn register_server(&self, server: &ToolServer) {
        if let Ok(mut tools) = self.tools.try_write() {
            for tool in server.tools() {
                let name = qualified_name(server.name(), tool.name());
                tools.insert(name.clone(), Arc::clone(tool));
                tracing::debug!("Registered tool: {}", name);
            }
            tracing::info!(
                server = server.name(),
                version = server.version(),
                tools = server.tools().len(),
                "Registered tool server"
            );
        }
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(name).cloned()
    }

    /// Check if a tool exists.
    pub async fn has(&self, name: &str) -> bool {
        self.tools.read().await.contains_key(name)
    }

    /// List all tool names, sorted.
    pub async fn list(&self) -> Vec<String> {
        self.tools.read().await.keys().cloned().collect()
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.try_read().map(|t| t.len()).unwrap_or(0)
    }

    /// Get tool definitions for LLM function calling.
    pub async fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .await
            .iter()
            .map(|(name, tool)| definition(name, tool.as_ref()))
            .collect()
    }

    /// Get tool definitions for specific tools, skipping unknown names.
    pub async fn tool_definitions_for(&self, names: &[String]) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        names
            .iter()
            .filter_map(|name| tools.get(name).map(|tool| definition(name, tool.as_ref())))
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self.get(name).await.ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;
        tool.execute(params).await
    }
}

fn definition(name: &str, tool: &dyn Tool) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters_schema(),
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
