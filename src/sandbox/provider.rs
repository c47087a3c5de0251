//! Sandbox provider trait and request/response types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Parameters for creating a sandbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSandboxParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

impl CreateSandboxParams {
    /// Label the provider reads to pick the code-run language.
    pub const LANGUAGE_LABEL: &'static str = "code-toolbox-language";

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.labels
            .insert(Self::LANGUAGE_LABEL.to_string(), language.into());
        self
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }
}

/// A sandbox as reported by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SandboxInfo {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Repository clone request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitCloneRequest {
    pub url: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Command execution request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteRequest {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl ExecuteRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
        }
    }

    pub fn in_dir(mut self, cwd: Option<String>) -> Self {
        self.cwd = cwd;
        self
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub exit_code: i32,
    /// Captured output.
    #[serde(default)]
    pub result: String,
}

/// Remote sandbox operations.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Create a sandbox and wait until it can run commands.
    ///
    /// A sandbox that was created but never started is deleted before the
    /// error is returned.
    async fn create(&self, params: &CreateSandboxParams) -> Result<SandboxInfo, SandboxError>;

    async fn git_clone(
        &self,
        sandbox_id: &str,
        request: &GitCloneRequest,
    ) -> Result<(), SandboxError>;

    async fn execute(
        &self,
        sandbox_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, SandboxError>;

    async fn delete(&self, sandbox_id: &str) -> Result<(), SandboxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_params_serialize_sparse() {
        let json = serde_json::to_value(CreateSandboxParams::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let json = serde_json::to_value(
            CreateSandboxParams::default()
                .with_language("python")
                .with_target(Some("us".into())),
        )
        .unwrap();
        assert_eq!(json["labels"]["code-toolbox-language"], "python");
        assert_eq!(json["target"], "us");
    }

    #[test]
    fn execute_response_uses_camel_case() {
        let response: ExecuteResponse =
            serde_json::from_value(serde_json::json!({"exitCode": 1, "result": "boom"})).unwrap();
        assert_eq!(response.exit_code, 1);
        assert_eq!(response.result, "boom");
    }

    #[test]
    fn execute_request_omits_unset_fields() {
        let json = serde_json::to_value(ExecuteRequest::new("ls")).unwrap();
        assert_eq!(json, serde_json::json!({"command": "ls"}));
    }
}
