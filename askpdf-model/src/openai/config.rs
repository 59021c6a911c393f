//! Configuration for [`OpenAIClient`](super::OpenAIClient).

use std::time::Duration;

/// Groq's OpenAI-compatible API base.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// The model used when none is configured.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for an OpenAI-compatible chat API.
///
/// The API key is optional so that a client can be built before a key is
/// available; requests fail with
/// [`ModelError::MissingCredential`](crate::ModelError::MissingCredential)
/// until one is set.
#[derive(Clone, PartialEq)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    /// Label used in errors and logs.
    pub provider: String,
}

impl OpenAIConfig {
    /// Groq with [`DEFAULT_GROQ_MODEL`].
    pub fn groq(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_GROQ_MODEL.to_string(),
            base_url: GROQ_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            provider: "Groq".to_string(),
        }
    }

    /// Any OpenAI-compatible endpoint.
    pub fn compatible(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            provider: "OpenAI-compatible".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sampling temperature sent with every request. Unset uses the model default.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The configured key, if it is present and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("provider", &self.provider)
            .finish()
    }
}
