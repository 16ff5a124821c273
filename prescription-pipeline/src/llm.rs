//! Stateless client for a Gemini-style `generateContent` endpoint.
//!
//! Failures come back as a typed [`LlmError`] rather than sentinel strings,
//! so callers branch explicitly instead of prefix-matching the payload. The
//! four categories (HTTP status, transport, malformed response shape,
//! unclassified) and their message texts match the service's historical
//! behavior.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error occurred: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    #[error("An error occurred while requesting {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error: Unexpected response structure from generation API: {0}")]
    MalformedResponse(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Seam over single-turn text generation.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn predict(&self, prompt: &str) -> Result<String, LlmError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl Generate for GeminiClient {
    /// Single-turn generation: the prompt is the sole user turn, plain text
    /// is requested back, and the first text part of the first candidate is
    /// returned.
    async fn predict(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ],
            "generationConfig": {
                "responseMimeType": "text/plain"
            }
        });

        let endpoint = format!("{}/{}:generateContent", self.base_url, self.model);
        debug!("Issuing generation request to model {}", self.model);

        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                url: endpoint.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Unexpected(e.to_string()))?;
        extract_candidate_text(&result)
    }
}

fn extract_candidate_text(result: &Value) -> Result<String, LlmError> {
    result
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::MalformedResponse(result.to_string()))
}
