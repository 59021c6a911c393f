//! OpenAI-compatible client implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::config::OpenAIConfig;
use crate::error::{ModelError, Result};
use crate::llm::{ChatMessage, ChatModel, ChatRequest, ChatResponse, Usage};

/// Client for Groq and other OpenAI-compatible chat APIs.
pub struct OpenAIClient {
    client: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIClient {
    /// Create a new client.
    ///
    /// Succeeds without an API key; see [`OpenAIConfig`].
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn provider(&self) -> String {
        self.config.provider.clone()
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Map a non-success status to the error kinds callers distinguish.
fn classify_status(provider: String, status: StatusCode, message: String) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ModelError::Unauthorized { provider, status: status.as_u16(), message }
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            ModelError::Unavailable { provider, message: format!("{status}: {message}") }
        }
        s if s.is_server_error() => {
            ModelError::Unavailable { provider, message: format!("{status}: {message}") }
        }
        _ => ModelError::Api { provider, status: status.as_u16(), message },
    }
}

// ── ChatModel implementation ───────────────────────────────────────

#[async_trait]
impl ChatModel for OpenAIClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let api_key = self
            .config
            .credential()
            .ok_or_else(|| ModelError::MissingCredential { provider: self.provider() })?;

        debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            message_count = request.messages.len(),
            "sending chat completion"
        );

        let body = CompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: self.config.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.config.provider, error = %e, "request failed");
                ModelError::Unavailable {
                    provider: self.provider(),
                    message: format!("request failed: {e}"),
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ModelError::Unavailable {
            provider: self.provider(),
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            error!(provider = %self.config.provider, %status, "API error");
            return Err(classify_status(self.provider(), status, detail));
        }

        let completion: CompletionResponse = serde_json::from_str(&text).map_err(|e| {
            error!(provider = %self.config.provider, error = %e, "failed to parse response");
            ModelError::InvalidResponse {
                provider: self.provider(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let Some(choice) = completion.choices.into_iter().next() else {
            return Err(ModelError::Declined {
                provider: self.provider(),
                reason: "response contained no choices".into(),
            });
        };

        if let Some(refusal) = choice.message.refusal {
            warn!(provider = %self.config.provider, "model refused to answer");
            return Err(ModelError::Declined { provider: self.provider(), reason: refusal });
        }
        if choice.finish_reason.as_deref() == Some("content_filter") {
            warn!(provider = %self.config.provider, "completion blocked by content filter");
            return Err(ModelError::Declined {
                provider: self.provider(),
                reason: "blocked by content filter".into(),
            });
        }

        let text = choice.message.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::Declined {
                provider: self.provider(),
                reason: "empty completion".into(),
            });
        }

        Ok(ChatResponse {
            text,
            model: completion.model.unwrap_or_else(|| self.config.model.clone()),
            finish_reason: choice.finish_reason,
            usage: completion.usage,
        })
    }
}
