use std::sync::Arc;

use note_bot::agent::{AgentClient, AgentOptions};
use note_bot::channels::{CliChannel, Typewriter};
use note_bot::config::ChatConfig;
use note_bot::llm::{LlmConfig, create_provider};
use note_bot::store::NoteStore;
use note_bot::tools::ToolRegistry;
use note_bot::tools::builtin::note_server;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the chat.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ChatConfig::from_env().map_err(|e| {
        eprintln!("  export ANTHROPIC_API_KEY=sk-ant-...");
        e
    })?;

    let llm = create_provider(&LlmConfig::from(&config));

    // ── Tools ────────────────────────────────────────────────────────────
    let store = Arc::new(NoteStore::new());
    let server = note_server(store);
    let tools = Arc::new(ToolRegistry::new());
    tools.register_server(&server);
    tracing::info!("Tools: {} registered", tools.count());

    // ── Agent ───────────────────────────────────────────────────────────
    let options = AgentOptions::from_config(&config, server.qualified_names());
    let client = AgentClient::new(llm, tools, options);
    tracing::info!(session_id = client.session_id(), "Agent session started");

    let mut cli = CliChannel::new(
        BufReader::new(tokio::io::stdin()),
        Typewriter::new(tokio::io::stdout(), config.typewriter_delay),
    );
    let turns = cli.run(&client).await?;
    tracing::info!(turns, "Session ended");

    Ok(())
}
