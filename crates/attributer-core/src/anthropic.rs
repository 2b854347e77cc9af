//! Anthropic Messages API client. reqwest only; one non-streamed call per question.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResponderError;
use crate::responder::{Completion, CompletionProvider, CompletionRequest};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull `error.message` out of a provider error body, if it has one.
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
}

/// Messages API client holding the provider credential.
pub struct AnthropicMessages {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicMessages {
    /// Client with an explicit credential and request timeout.
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            base_url: ANTHROPIC_API_BASE.to_string(),
            timeout,
            client,
        }
    }

    /// Client using `ANTHROPIC_API_KEY`. Returns `None` if unset or blank.
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let key = std::env::var("ANTHROPIC_API_KEY").ok()?;
        if key.trim().is_empty() {
            return None;
        }
        Some(Self::new(&key, timeout))
    }

    /// Point at a different API host (proxy, mock server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn map_transport(&self, err: reqwest::Error) -> ResponderError {
        if err.is_timeout() {
            ResponderError::Upstream(format!(
                "Model provider timed out after {:?}",
                self.timeout
            ))
        } else {
            ResponderError::Upstream(format!("Model provider request failed: {}", err))
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicMessages {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ResponderError> {
        if self.api_key.is_empty() {
            return Err(ResponderError::Upstream(
                "Provider credential is not configured".to_string(),
            ));
        }

        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [UserMessage {
                role: "user",
                content: &request.user,
            }],
        };

        let res = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "model provider returned an error");
            let message = provider_message(&text)
                .unwrap_or_else(|| format!("Model provider returned HTTP {}", status.as_u16()));
            return Err(ResponderError::Upstream(message));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            ResponderError::Upstream(format!("Model provider response was not readable: {}", e))
        })?;

        // A reply with no blocks is still a reply, just not a text one.
        let Some(ContentBlock { kind, text }) = parsed.content.into_iter().next() else {
            return Ok(Completion::Other("empty".to_string()));
        };

        Ok(match text {
            Some(text) if kind == "text" => Completion::Text(text),
            _ => Completion::Other(kind),
        })
    }
}
