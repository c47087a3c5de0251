//! Provision a Daytona sandbox, optionally clone a repository, run commands,
//! and delete the sandbox.
//!
//! With no arguments this runs a single Python hello-world.

use std::sync::Arc;

use clap::Parser;
use note_bot::channels::Typewriter;
use note_bot::config::SandboxConfig;
use note_bot::sandbox::{CreateSandboxParams, DaytonaClient, RepoSpec, SandboxScript, Step};

#[derive(Parser, Debug)]
#[command(name = "sandbox-run", about = "Run commands in an ephemeral Daytona sandbox")]
struct Args {
    /// Repository URL to clone into the sandbox.
    #[arg(long)]
    repo: Option<String>,

    /// Branch to clone.
    #[arg(long, default_value = "main", requires = "repo")]
    branch: String,

    /// Clone destination inside the sandbox; commands run from here.
    #[arg(long, default_value = "workspace/repo", requires = "repo")]
    path: String,

    /// Shell command to run (repeatable, runs in order).
    #[arg(long = "exec", value_name = "CMD")]
    commands: Vec<String>,

    /// Python code to run before the commands.
    #[arg(long)]
    code: Option<String>,

    /// Sandbox language label.
    #[arg(long, default_value = "python")]
    language: String,
}

impl Args {
    fn into_script(self, target: Option<String>) -> SandboxScript {
        let params = CreateSandboxParams::default()
            .with_language(self.language)
            .with_target(target);

        if self.repo.is_none() && self.commands.is_empty() && self.code.is_none() {
            return SandboxScript::hello_world(params);
        }

        let mut script = SandboxScript::new(params);
        if let Some(url) = self.repo {
            script = script.with_repository(RepoSpec {
                url,
                branch: self.branch,
                path: self.path,
            });
        }
        if let Some(code) = self.code {
            script = script.with_step(Step::Code(code));
        }
        for command in self.commands {
            script = script.with_step(Step::Command(command));
        }
        script
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = SandboxConfig::from_env()?;
    let script = args.into_script(config.target.clone());

    let provider = Arc::new(DaytonaClient::new(config));
    let mut out = Typewriter::instant(tokio::io::stdout());
    let report = script.run(provider, &mut out).await?;

    tracing::info!(
        sandbox_id = %report.sandbox_id,
        steps = report.steps.len(),
        failures = report.failures(),
        "Sandbox script finished"
    );
    Ok(())
}
