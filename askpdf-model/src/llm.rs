//! The chat model abstraction and its request/response types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and context for the model.
    System,
    /// The end user.
    User,
    /// A previous model turn.
    Assistant,
}

/// A single message in a chat conversation.
///
/// Serializes to the OpenAI wire shape `{"role": "...", "content": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A request for a single, non-streaming chat completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a request from a list of messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The generated answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Generated text, verbatim.
    pub text: String,
    /// The model that produced the text, as reported by the service.
    pub model: String,
    /// Why generation stopped (`stop`, `length`, ...), when reported.
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// A language model that answers chat requests.
///
/// Implementations must fail with [`ModelError::MissingCredential`](crate::ModelError::MissingCredential)
/// before any network traffic when no credential is configured.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The configured model name.
    fn name(&self) -> &str;

    /// Generate a completion for the request.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;
}
