use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("unexpected response shape: {0}")]
    Malformed(&'static str),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else {
            AiError::Request(err)
        }
    }
}

/// One chat turn, in the provider's wire format. Client request bodies are
/// forwarded as-is after JSON validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Client for the opaque downstream AI provider. Every call carries a
/// bounded timeout; a hung provider surfaces as `AiError::Timeout` instead
/// of wedging the request handler.
pub struct AiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    image_model: String,
}

impl AiClient {
    pub fn from_config() -> Result<Self, AiError> {
        let ai_config = &config::config().openai;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(ai_config.request_timeout_secs))
            .build()
            .map_err(AiError::Request)?;

        Ok(Self {
            http,
            api_key: ai_config.api_key.clone(),
            base_url: ai_config.base_url.trim_end_matches('/').to_string(),
            chat_model: ai_config.chat_model.clone(),
            image_model: ai_config.image_model.clone(),
        })
    }

    /// Run a chat completion and return the assistant's reply text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiError> {
        let body = json!({
            "model": self.chat_model,
            "messages": messages,
        });

        let response = self.post("/chat/completions", &body).await?;
        response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AiError::Malformed("missing choices[0].message.content"))
    }

    /// Generate a single image and return its URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
        });

        let response = self.post("/images/generations", &body).await?;
        response
            .pointer("/data/0/url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AiError::Malformed("missing data[0].url"))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, AiError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AiError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}
