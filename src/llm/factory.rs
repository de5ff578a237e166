//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::error::{AskError, Result};
use crate::llm::{GatewayConfig, GeminiClient, LlmClient, LlmProvider, MockLlmClient, OpenAiClient};

/// Creates an LLM client for the configured provider.
///
/// Remote providers require `config.api_key`; it is resolved at startup and
/// never looked up here.
pub fn create_client(config: &GatewayConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Gemini => {
            let key = require_key(config)?;
            Ok(Box::new(GeminiClient::new(config, key)?))
        }
        LlmProvider::OpenAi => {
            let key = require_key(config)?;
            Ok(Box::new(OpenAiClient::new(config, key)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

fn require_key(config: &GatewayConfig) -> Result<String> {
    config.api_key.clone().ok_or_else(|| {
        let var = config.provider.api_key_env().unwrap_or("the API key variable");
        AskError::gateway(format!(
            "No API key configured for {}. Set {var} in the environment or .env file.",
            config.provider
        ))
    })
}
