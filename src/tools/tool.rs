//! The `Tool` trait and tool output types.

use std::time::Duration;

use async_trait::async_trait;

pub use crate::error::ToolError;
use crate::llm::ContentBlock;

/// Output of a tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Content blocks returned to the model.
    pub content: Vec<ContentBlock>,
    /// Wall-clock execution time.
    pub duration: Duration,
}

impl ToolOutput {
    /// A single text block.
    pub fn text(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            duration,
        }
    }

    /// The first text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A named, schema-described function the model may call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within its server.
    fn name(&self) -> &str;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema of the parameters object.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Run the tool.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError>;
}

/// Extract a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing '{}' parameter", name)))
}

/// Schema for an object with string properties, all required.
pub fn string_params_schema(fields: &[(&str, &str)]) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                serde_json::json!({"type": "string", "description": description}),
            )
        })
        .collect();
    let required: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_present() {
        let params = serde_json::json!({"content": "hello"});
        assert_eq!(require_str(&params, "content").unwrap(), "hello");
    }

    #[test]
    fn require_str_missing_or_wrong_type() {
        let params = serde_json::json!({"content": 5});
        assert!(matches!(
            require_str(&params, "content"),
            Err(ToolError::InvalidParameters(_))
        ));
        assert!(require_str(&serde_json::json!({}), "query").is_err());
    }

    #[test]
    fn empty_schema_has_no_required_fields() {
        let schema = string_params_schema(&[]);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"], serde_json::json!({}));
        assert_eq!(schema["required"], serde_json::json!([]));
    }

    #[test]
    fn schema_lists_required_strings() {
        let schema = string_params_schema(&[("query", "Text to search for")]);
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["required"], serde_json::json!(["query"]));
    }
}
