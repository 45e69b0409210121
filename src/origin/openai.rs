//! OpenAI chat-completions provider.
//!
//! Speaks the `/v1/chat/completions` REST endpoint directly: one system
//! instruction plus the raw query, one completion back.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{OriginProvider, SYSTEM_INSTRUCTION};
use crate::error::{EchoError, Result};

/// OpenAI REST API base.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default model when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Provider speaking the OpenAI chat-completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: Self::build_client(),
        }
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client")
    }

    /// Build the single-turn request body: fixed system instruction + query.
    pub fn build_request_body(&self, query: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": query }
            ]
        })
    }

    /// Extract the completion text from a chat-completions response.
    pub fn extract_text(response: &Value) -> Option<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", OPENAI_API_BASE)
    }
}

#[async_trait]
impl OriginProvider for OpenAiProvider {
    async fn complete(&self, query: &str) -> Result<String> {
        let body = self.build_request_body(query);

        debug!("OpenAI request to model {}", self.model);

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EchoError::Origin(format!("OpenAI request failed: {e}")))?;

        if response.status().is_success() {
            let json: Value = response
                .json()
                .await
                .map_err(|e| EchoError::Origin(format!("Failed to parse OpenAI response: {e}")))?;

            return Self::extract_text(&json)
                .ok_or_else(|| EchoError::Origin("OpenAI response contained no text".to_string()));
        }

        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();

        // Prefer the message field from the OpenAI error body when present.
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(error_text);

        Err(EchoError::Origin(format!(
            "OpenAI API error (status {status}): {message}"
        )))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
