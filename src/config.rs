//! Configuration types, read from the environment at startup.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Anthropic model for the chatbot.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default Anthropic API base URL.
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Default Daytona API URL.
pub const DEFAULT_DAYTONA_API_URL: &str = "https://app.daytona.io/api";

/// System prompt for the note-taking assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful note-taking assistant. \
Use mcp__note_tools__save_note to save notes, mcp__note_tools__find_note to search notes, \
and mcp__note_tools__get_inspirational_quote for motivation. \
Be concise and friendly. Commands: exit.";

/// Chatbot configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Anthropic API key.
    pub api_key: SecretString,
    /// Base URL of the Messages API (overridable for proxies and tests).
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Maximum output tokens per model call.
    pub max_tokens: u32,
    /// Maximum model calls per user turn.
    pub max_turns: u32,
    /// Delay between characters when printing assistant text.
    pub typewriter_delay: Duration,
    /// System prompt sent with every request.
    pub system_prompt: String,
}

impl ChatConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ANTHROPIC_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".into()))?;

        let typewriter_ms: u64 = parse_or(&lookup, "NOTE_BOT_TYPEWRITER_MS", 50)?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url: lookup("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            model: lookup("NOTE_BOT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(&lookup, "NOTE_BOT_MAX_TOKENS", 1024)?,
            max_turns: parse_or(&lookup, "NOTE_BOT_MAX_TURNS", 10)?,
            typewriter_delay: Duration::from_millis(typewriter_ms),
            system_prompt: lookup("NOTE_BOT_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }
}

/// Sandbox provider configuration.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Daytona API key. Never hard-coded.
    pub api_key: SecretString,
    /// Daytona API URL.
    pub api_url: String,
    /// Target region, if any.
    pub target: Option<String>,
    /// How long to wait for a new sandbox to reach the started state.
    pub start_timeout: Duration,
    /// Polling interval while waiting for start.
    pub poll_interval: Duration,
}

impl SandboxConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("DAYTONA_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DAYTONA_API_KEY".into()))?;

        let start_timeout_secs: u64 = parse_or(&lookup, "DAYTONA_START_TIMEOUT_SECS", 60)?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_url: lookup("DAYTONA_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_DAYTONA_API_URL.to_string()),
            target: lookup("DAYTONA_TARGET").filter(|t| !t.is_empty()),
            start_timeout: Duration::from_secs(start_timeout_secs),
            poll_interval: Duration::from_secs(1),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
