//! The sandbox provisioning script.
//!
//! Create a sandbox, optionally clone a repository, run each step in order,
//! then delete the sandbox. A step with a non-zero exit code prints an error
//! line and the script moves on to the next step.

use std::sync::Arc;

use crate::channels::OutputSink;
use crate::error::Error;
use crate::sandbox::provider::{CreateSandboxParams, SandboxProvider};
use crate::sandbox::session::{Sandbox, with_sandbox};

/// Code run when no steps are given.
pub const HELLO_WORLD_CODE: &str = r#"print("Hello World from code!")"#;

/// Repository to clone before running steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub url: String,
    pub branch: String,
    /// Destination inside the sandbox; also the working directory for commands.
    pub path: String,
}

/// One unit of work inside the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Shell command.
    Command(String),
    /// Python snippet.
    Code(String),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Command(cmd) => write!(f, "$ {cmd}"),
            Step::Code(code) => write!(f, "python: {code}"),
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub exit_code: i32,
    pub output: String,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Outcome of the whole script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub sandbox_id: String,
    pub steps: Vec<StepReport>,
}

impl ScriptReport {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.succeeded()).count()
    }
}

/// What to do inside the sandbox.
#[derive(Debug, Clone, Default)]
pub struct SandboxScript {
    pub params: CreateSandboxParams,
    pub repository: Option<RepoSpec>,
    pub steps: Vec<Step>,
}

impl SandboxScript {
    pub fn new(params: CreateSandboxParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// The single hello-world code run.
    pub fn hello_world(params: CreateSandboxParams) -> Self {
        Self::new(params).with_step(Step::Code(HELLO_WORLD_CODE.to_string()))
    }

    pub fn with_repository(mut self, repository: RepoSpec) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Run the script, printing each step's output or error line to `sink`.
    ///
    /// Transport errors abort the remaining steps; the sandbox is still deleted.
    pub async fn run<S: OutputSink>(
        &self,
        provider: Arc<dyn SandboxProvider>,
        sink: &mut S,
    ) -> Result<ScriptReport, Error> {
        with_sandbox(provider, &self.params, |sandbox| async move {
            if let Some(ref repo) = self.repository {
                sandbox
                    .git_clone(&repo.url, Some(&repo.branch), &repo.path)
                    .await?;
                tracing::info!(url = %repo.url, branch = %repo.branch, "Repository cloned");
            }

            let mut steps = Vec::with_capacity(self.steps.len());
            for step in &self.steps {
                let report = self.run_step(&sandbox, step).await?;
                if report.succeeded() {
                    sink.write(&format!("{}\n", report.output.trim_end())).await?;
                } else {
                    tracing::warn!(step = %step, exit_code = report.exit_code, "Step failed");
                    sink.write(&format!(
                        "Error: {} {}\n",
                        report.exit_code,
                        report.output.trim_end()
                    ))
                    .await?;
                }
                steps.push(report);
            }

            Ok(ScriptReport {
                sandbox_id: sandbox.id().to_string(),
                steps,
            })
        })
        .await
    }

    async fn run_step(&self, sandbox: &Sandbox, step: &Step) -> Result<StepReport, Error> {
        let cwd = self.repository.as_ref().map(|r| r.path.as_str());
        let response = match step {
            Step::Command(cmd) => sandbox.exec(cmd, cwd).await?,
            Step::Code(code) => sandbox.code_run(code).await?,
        };
        Ok(StepReport {
            step: step.clone(),
            exit_code: response.exit_code,
            output: response.result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_has_one_code_step() {
        let script = SandboxScript::hello_world(CreateSandboxParams::default());
        assert_eq!(script.steps, vec![Step::Code(HELLO_WORLD_CODE.to_string())]);
        assert!(script.repository.is_none());
    }

    #[test]
    fn step_display() {
        assert_eq!(Step::Command("ls".into()).to_string(), "$ ls");
        assert_eq!(Step::Code("1+1".into()).to_string(), "python: 1+1");
    }

    #[test]
    fn report_counts_failures() {
        let report = ScriptReport {
            sandbox_id: "s".into(),
            steps: vec![
                StepReport {
                    step: Step::Command("true".into()),
                    exit_code: 0,
                    output: String::new(),
                },
                StepReport {
                    step: Step::Command("false".into()),
                    exit_code: 1,
                    output: String::new(),
                },
            ],
        };
        assert_eq!(report.failures(), 1);
    }
}
