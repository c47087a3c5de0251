//! Note tools: save and search the in-memory note store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{NoteStore, render_matches};
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str, string_params_schema};

// ── save_note ───────────────────────────────────────────────────────

/// Tool for saving a note.
pub struct SaveNoteTool {
    store: Arc<NoteStore>,
}

impl SaveNoteTool {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveNoteTool {
    fn name(&self) -> &str {
        "save_note"
    }

    fn description(&self) -> &str {
        "Save a note with the given content."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        string_params_schema(&[("content", "Text of the note")])
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let content = require_str(&params, "content")?;
        let id = self.store.save(content);
        Ok(ToolOutput::text(
            format!("Note saved with ID: {}", id),
            start.elapsed(),
        ))
    }
}

// ── find_note ───────────────────────────────────────────────────────

/// Tool for searching notes by substring.
pub struct FindNoteTool {
    store: Arc<NoteStore>,
}

impl FindNoteTool {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for FindNoteTool {
    fn name(&self) -> &str {
        "find_note"
    }

    fn description(&self) -> &str {
        "Find notes matching the query."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        string_params_schema(&[("query", "Text to search for, case-insensitive")])
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let query = require_str(&params, "query")?;
        let matches = self.store.find(query);
        tracing::debug!(query, matches = matches.len(), "Searched notes");
        Ok(ToolOutput::text(render_matches(&matches), start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NO_MATCHES;

    #[tokio::test]
    async fn save_then_find() {
        let store = Arc::new(NoteStore::new());
        let save = SaveNoteTool::new(Arc::clone(&store));
        let find = FindNoteTool::new(Arc::clone(&store));

        let out = save
            .execute(serde_json::json!({"content": "Buy milk"}))
            .await
            .unwrap();
        assert_eq!(out.first_text(), Some("Note saved with ID: 1"));
        assert_eq!(out.content.len(), 1);

        save.execute(serde_json::json!({"content": "Call mom"}))
            .await
            .unwrap();

        let out = find
            .execute(serde_json::json!({"query": "call"}))
            .await
            .unwrap();
        assert_eq!(out.first_text(), Some("ID 2: Call mom"));

        let out = find
            .execute(serde_json::json!({"query": "xyz"}))
            .await
            .unwrap();
        assert_eq!(out.first_text(), Some(NO_MATCHES));
    }

    #[tokio::test]
    async fn missing_parameter_is_rejected() {
        let store = Arc::new(NoteStore::new());
        let save = SaveNoteTool::new(Arc::clone(&store));
        let err = save.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn schemas_require_their_field() {
        let store = Arc::new(NoteStore::new());
        let save = SaveNoteTool::new(Arc::clone(&store)).parameters_schema();
        let find = FindNoteTool::new(store).parameters_schema();
        assert_eq!(save["required"], serde_json::json!(["content"]));
        assert_eq!(find["required"], serde_json::json!(["query"]));
    }
}
