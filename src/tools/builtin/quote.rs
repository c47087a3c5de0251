//! Inspirational quote tool.

use async_trait::async_trait;

use crate::quotes;
use crate::tools::tool::{Tool, ToolError, ToolOutput, string_params_schema};

/// Returns one random quote; takes no parameters.
pub struct InspirationalQuoteTool;

#[async_trait]
impl Tool for InspirationalQuoteTool {
    fn name(&self) -> &str {
        "get_inspirational_quote"
    }

    fn description(&self) -> &str {
        "Get a random inspirational quote to motivate the user."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        string_params_schema(&[])
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        Ok(ToolOutput::text(quotes::pick(), start.elapsed()))
    }
}
