//! LLM integration for askdb.
//!
//! Provides the gateway trait and implementations for the supported
//! text-generation providers.

pub mod factory;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod prompt;
pub mod sanitizer;

pub use factory::create_client;
pub use gemini::GeminiClient;
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use prompt::compose_prompt;
pub use sanitizer::sanitize_sql;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that turn a prompt into generated text.
///
/// Each call issues exactly one request. Implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends the prompt and returns the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini
    #[default]
    Gemini,
    /// OpenAI (GPT-4o, etc.)
    OpenAi,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }

    /// Model used when the config file names none.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-3-flash-preview",
            Self::OpenAi => "gpt-4o",
            Self::Mock => "mock",
        }
    }

    /// Environment variable holding the provider's API key, if it needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Mock => None,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            _ => Err(format!(
                "Unknown LLM provider: {s}. Expected gemini, openai or mock"
            )),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything needed to build a gateway client, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: Option<String>,
    /// Request timeout; `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
    /// Endpoint override, mainly for proxies and tests.
    pub base_url: Option<String>,
}

impl GatewayConfig {
    /// Creates a config for `provider` with its default model.
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            timeout_secs: None,
            base_url: None,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builds the HTTP client shared by the remote providers.
pub(crate) fn http_client(config: &GatewayConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    builder.build().map_err(|e| {
        crate::error::AskError::gateway(format!("Failed to create HTTP client: {e}"))
    })
}
