//! LLM integration for note-bot.
//!
//! Talks to the Anthropic Messages API directly over `reqwest`. The
//! `LlmProvider` trait is the seam the agent runtime depends on, so tests can
//! script model responses without the network.

mod anthropic;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use provider::*;

use std::sync::Arc;

use crate::config::ChatConfig;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub base_url: String,
    pub model: String,
}

impl From<&ChatConfig> for LlmConfig {
    fn from(config: &ChatConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    tracing::info!("Using Anthropic (model: {})", config.model);
    Arc::new(AnthropicProvider::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.model.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_with_any_key() {
        // The key is only checked by the API on the first request.
        let config = LlmConfig {
            api_key: secrecy::SecretString::from("test-key"),
            base_url: crate::config::DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
        };
        let provider = create_provider(&config);
        assert_eq!(provider.model_name(), "claude-3-5-sonnet-latest");
    }
}
