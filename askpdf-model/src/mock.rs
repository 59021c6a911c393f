//! A [`ChatModel`] with scripted behaviour, for tests and offline demos.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::llm::{ChatModel, ChatRequest, ChatResponse};

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Echo,
    Fail(ModelError),
}

/// A mock chat model that records every request it receives.
///
/// # Example
///
/// ```rust,ignore
/// let model = MockChatModel::new("Paris");
/// let response = model.complete(request).await?;
/// assert_eq!(response.text, "Paris");
/// assert_eq!(model.requests().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockChatModel {
    name: String,
    behavior: Behavior,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatModel {
    /// Always answer with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(reply.into()))
    }

    /// Answer with every message's content joined by newlines.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Always fail with `error`.
    pub fn failing(error: ModelError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self { name: "mock-model".to_string(), behavior, requests: Mutex::new(Vec::new()) }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let text = match &self.behavior {
            Behavior::Reply(reply) => reply.clone(),
            Behavior::Echo => request
                .messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Behavior::Fail(error) => {
                self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
                return Err(error.clone());
            }
        };
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        Ok(ChatResponse {
            text,
            model: self.name.clone(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }
}
