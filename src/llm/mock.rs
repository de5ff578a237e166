//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on the question in the prompt.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{AskError, Result};
use crate::llm::prompt::QUESTION_HEADER;
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Only the question part of the prompt is matched, so table names in the
/// schema block do not trigger responses. Clones share the prompt log.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Error message returned instead of a response, if set.
    failure: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the question contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes every call fail with a gateway error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Generates a mock response based on the question.
    fn mock_response(&self, question: &str) -> String {
        let input_lower = question.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if input_lower.contains("all users") || input_lower.contains("show users") {
            return "```sql\nSELECT * FROM users;\n```".to_string();
        }

        if (input_lower.contains("count") || input_lower.contains("how many"))
            && input_lower.contains("orders")
        {
            return "```sql\nSELECT COUNT(*) FROM orders;\n```".to_string();
        }

        if (input_lower.contains("count") || input_lower.contains("how many"))
            && input_lower.contains("users")
        {
            return "```sql\nSELECT COUNT(*) FROM users;\n```".to_string();
        }

        if (input_lower.contains("insert") || input_lower.contains("add"))
            && input_lower.contains("user")
        {
            return "```sql\nINSERT INTO users (name) VALUES ('Test User');\n```".to_string();
        }

        if input_lower.contains("update") && input_lower.contains("user") {
            return "```sql\nUPDATE users SET name = 'Updated Name' WHERE id = 1;\n```".to_string();
        }

        if input_lower.contains("delete") && input_lower.contains("user") {
            return "```sql\nDELETE FROM users WHERE id = 1;\n```".to_string();
        }

        "```sql\nSELECT 1;\n```".to_string()
    }

    /// Extracts the question from a composed prompt.
    fn extract_question(prompt: &str) -> &str {
        prompt
            .rsplit_once(QUESTION_HEADER)
            .map(|(_, question)| question)
            .unwrap_or(prompt)
            .trim()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(message) = &self.failure {
            return Err(AskError::gateway(message.clone()));
        }

        Ok(self.mock_response(Self::extract_question(prompt)))
    }
}
