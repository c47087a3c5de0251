//! Scoped sandbox ownership.
//!
//! [`with_sandbox`] creates a sandbox, hands a [`Sandbox`] handle to the body,
//! and deletes the sandbox once the body finishes, whether it returned `Ok`,
//! `Err`, or panicked. The handle refuses further calls after deletion.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;

use crate::error::SandboxError;
use crate::sandbox::provider::{
    CreateSandboxParams, ExecuteRequest, ExecuteResponse, GitCloneRequest, SandboxProvider,
};

/// Handle to a live sandbox.
pub struct Sandbox {
    id: String,
    provider: Arc<dyn SandboxProvider>,
    live: Arc<AtomicBool>,
}

impl Sandbox {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn ensure_live(&self) -> Result<(), SandboxError> {
        if self.live.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(SandboxError::Released {
                id: self.id.clone(),
            })
        }
    }

    /// Clone a repository into `path` inside the sandbox.
    pub async fn git_clone(
        &self,
        url: &str,
        branch: Option<&str>,
        path: &str,
    ) -> Result<(), SandboxError> {
        self.ensure_live()?;
        let request = GitCloneRequest {
            url: url.to_string(),
            path: path.to_string(),
            branch: branch.map(str::to_string),
        };
        self.provider.git_clone(&self.id, &request).await
    }

    /// Run a shell command.
    pub async fn exec(
        &self,
        command: &str,
        cwd: Option<&str>,
    ) -> Result<ExecuteResponse, SandboxError> {
        self.ensure_live()?;
        let request = ExecuteRequest::new(command).in_dir(cwd.map(str::to_string));
        self.provider.execute(&self.id, &request).await
    }

    /// Run a Python snippet.
    pub async fn code_run(&self, code: &str) -> Result<ExecuteResponse, SandboxError> {
        self.exec(&format!("python3 -c {}", shell_quote(code)), None)
            .await
    }
}

/// Create a sandbox, run `body` with it, then delete it on every exit path.
///
/// The body's error wins over a deletion error; a deletion error is returned
/// only when the body succeeded. Panics in the body are re-raised after
/// deletion.
pub async fn with_sandbox<F, Fut, T, E>(
    provider: Arc<dyn SandboxProvider>,
    params: &CreateSandboxParams,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(Sandbox) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<SandboxError>,
{
    let info = provider.create(params).await?;
    let id = info.id;
    tracing::info!(sandbox_id = %id, "Sandbox created");

    let live = Arc::new(AtomicBool::new(true));
    let handle = Sandbox {
        id: id.clone(),
        provider: Arc::clone(&provider),
        live: Arc::clone(&live),
    };

    let outcome = AssertUnwindSafe(body(handle)).catch_unwind().await;

    live.store(false, Ordering::Release);
    let deleted = provider.delete(&id).await;
    match &deleted {
        Ok(()) => tracing::info!(sandbox_id = %id, "Sandbox deleted"),
        Err(e) => tracing::error!(sandbox_id = %id, error = %e, "Failed to delete sandbox"),
    }

    match outcome {
        Err(panic) => std::panic::resume_unwind(panic),
        Ok(Err(e)) => Err(e),
        Ok(Ok(value)) => {
            deleted?;
            Ok(value)
        }
    }
}

/// Quote a string for POSIX `sh` using single quotes.
pub fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}
