//! Google Gemini LLM client implementation.
//!
//! Implements the LlmClient trait for the Gemini `generateContent` API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AskError, Result};
use crate::llm::{http_client, GatewayConfig, LlmClient};

/// Gemini API base URL.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini LLM client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    pub fn new(config: &GatewayConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_URL.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Parses an API error response.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> AskError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return AskError::gateway("Authentication failed. Check your GEMINI_API_KEY.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return AskError::gateway("Rate limited. Please wait and try again.");
        }

        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            return AskError::gateway(format!(
                "Gemini API error: {}",
                error_response.error.message
            ));
        }

        AskError::gateway(format!("Gemini API error ({status}): {body}"))
    }

    /// Extracts the generated text from a successful response.
    ///
    /// Thought parts are skipped; a blocked prompt or a response without text
    /// is an error.
    fn extract_text(response: GeminiResponse) -> Result<String> {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(AskError::gateway(format!(
                "The model returned no usable text (prompt blocked: {reason})"
            )));
        }

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AskError::gateway("The model returned no usable text"));
        }

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                    thought: false,
                }],
            }],
        };

        debug!(model = %self.model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AskError::gateway("Request timed out. Try again.")
                } else if e.is_connect() {
                    AskError::gateway("Failed to connect to the Gemini API. Check your network.")
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

        let response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| AskError::gateway(format!("Failed to parse response: {e}")))?;

        Self::extract_text(response)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
