//! Daytona REST client.

use std::time::Instant;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::sandbox::provider::{
    CreateSandboxParams, ExecuteRequest, ExecuteResponse, GitCloneRequest, SandboxInfo,
    SandboxProvider,
};

const STATE_STARTED: &str = "started";
const FAILED_STATES: &[&str] = &["error", "build_failed", "destroyed"];

/// Daytona API client.
pub struct DaytonaClient {
    client: reqwest::Client,
    api_key: SecretString,
    api_url: String,
    config: SandboxConfig,
}

impl DaytonaClient {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn toolbox_url(&self, sandbox_id: &str, path: &str) -> String {
        self.url(&format!("toolbox/{sandbox_id}/toolbox/{path}"))
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SandboxError> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| SandboxError::RequestFailed {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SandboxError::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SandboxError> {
        self.send(operation, request)
            .await?
            .json()
            .await
            .map_err(|e| SandboxError::RequestFailed {
                operation: operation.to_string(),
                reason: format!("invalid response body: {e}"),
            })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        url: String,
        body: &B,
    ) -> Result<reqwest::Response, SandboxError> {
        self.send(operation, self.client.post(url).json(body)).await
    }

    /// Fetch the current sandbox state.
    pub async fn get(&self, sandbox_id: &str) -> Result<SandboxInfo, SandboxError> {
        let url = self.url(&format!("sandbox/{sandbox_id}"));
        self.send_json("get", self.client.get(url)).await
    }

    /// Poll until the sandbox reports `started`.
    async fn wait_until_started(&self, mut info: SandboxInfo) -> Result<SandboxInfo, SandboxError> {
        let start = Instant::now();
        loop {
            let state = info.state.clone().unwrap_or_default();
            if state == STATE_STARTED {
                return Ok(info);
            }
            if FAILED_STATES.contains(&state.as_str()) {
                return Err(SandboxError::Failed { id: info.id, state });
            }
            if start.elapsed() >= self.config.start_timeout {
                return Err(SandboxError::StartTimeout {
                    id: info.id,
                    waited: start.elapsed(),
                    state,
                });
            }
            tracing::debug!(sandbox_id = %info.id, state = %state, "Waiting for sandbox to start");
            tokio::time::sleep(self.config.poll_interval).await;
            info = self.get(&info.id).await?;
        }
    }
}

#[async_trait]
impl SandboxProvider for DaytonaClient {
    async fn create(&self, params: &CreateSandboxParams) -> Result<SandboxInfo, SandboxError> {
        let mut params = params.clone();
        if params.target.is_none() {
            params.target = self.config.target.clone();
        }
        let response = self.post("create", self.url("sandbox"), &params).await?;
        let info: SandboxInfo = response
            .json()
            .await
            .map_err(|e| SandboxError::RequestFailed {
                operation: "create".into(),
                reason: format!("invalid response body: {e}"),
            })?;
        tracing::debug!(sandbox_id = %info.id, state = ?info.state, "Sandbox create accepted");

        let id = info.id.clone();
        match self.wait_until_started(info).await {
            Ok(started) => Ok(started),
            Err(e) => {
                // The sandbox exists remotely even though it never started.
                if let Err(delete_err) = self.delete(&id).await {
                    tracing::warn!(
                        sandbox_id = %id,
                        error = %delete_err,
                        "Failed to delete sandbox that did not start"
                    );
                }
                Err(e)
            }
        }
    }

    async fn git_clone(
        &self,
        sandbox_id: &str,
        request: &GitCloneRequest,
    ) -> Result<(), SandboxError> {
        tracing::info!(
            sandbox_id,
            url = %request.url,
            branch = ?request.branch,
            path = %request.path,
            "Cloning repository"
        );
        self.post("git_clone", self.toolbox_url(sandbox_id, "git/clone"), request)
            .await?;
        Ok(())
    }

    async fn execute(
        &self,
        sandbox_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, SandboxError> {
        tracing::debug!(sandbox_id, command = %request.command, "Executing command");
        let url = self.toolbox_url(sandbox_id, "process/execute");
        self.send_json("execute", self.client.post(url).json(request))
            .await
    }

    async fn delete(&self, sandbox_id: &str) -> Result<(), SandboxError> {
        let url = self.url(&format!("sandbox/{sandbox_id}"));
        self.send("delete", self.client.delete(url)).await?;
        Ok(())
    }
}
