//! OpenAI LLM client implementation.
//!
//! Implements the LlmClient trait for OpenAI's chat completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AskError, Result};
use crate::llm::{http_client, GatewayConfig, LlmClient};

/// OpenAI API base URL.
const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// OpenAI LLM client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new OpenAI client.
    pub fn new(config: &GatewayConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Parses an API error response.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> AskError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return AskError::gateway("Authentication failed. Check your OPENAI_API_KEY.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return AskError::gateway("Rate limited. Please wait and try again.");
        }

        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            return AskError::gateway(format!(
                "OpenAI API error: {}",
                error_response.error.message
            ));
        }

        AskError::gateway(format!("OpenAI API error ({status}): {body}"))
    }

    fn extract_text(response: OpenAiResponse) -> Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AskError::gateway("The model returned no usable text"))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
        };

        debug!(model = %self.model, "Sending OpenAI chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AskError::gateway("Request timed out. Try again.")
                } else if e.is_connect() {
                    AskError::gateway("Failed to connect to OpenAI API. Check your network.")
                } else {
                    AskError::gateway(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AskError::gateway(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let response: OpenAiResponse = serde_json::from_str(&body)
            .map_err(|e| AskError::gateway(format!("Failed to parse response: {e}")))?;

        Self::extract_text(response)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}
