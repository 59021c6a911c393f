//! Answer synthesis: stuff the retrieved chunks into a prompt and ask the model.

use std::sync::Arc;

use askpdf_model::{ChatMessage, ChatModel, ChatRequest};
use serde::Serialize;
use tracing::{error, info};

use crate::document::SearchResult;
use crate::error::{RagError, Result};

/// Instructions sent as the system message. `{context}` is replaced by the
/// retrieved chunks separated by blank lines.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the user's question. \n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n\
{context}";

/// A generated answer and the context it was conditioned on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Model output, verbatim.
    pub text: String,
    /// The model that produced the answer.
    pub model: String,
    /// Retrieved chunks passed as context, best first.
    pub sources: Vec<SearchResult>,
}

/// Builds prompts from retrieved chunks and forwards them to a [`ChatModel`].
pub struct Answerer {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl Answerer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, system_prompt: DEFAULT_SYSTEM_PROMPT.to_string() }
    }

    /// Replace the system prompt. It should contain a `{context}` placeholder.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    /// Assemble the chat request: a system message carrying the context,
    /// then the question as the user message.
    pub fn build_request(&self, question: &str, results: &[SearchResult]) -> ChatRequest {
        let context =
            results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let system = self.system_prompt.replace("{context}", &context);
        ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(question)])
    }

    /// Answer `question` from `results`.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoContext`] if the question is blank or `results` is empty;
    ///   the model is not called.
    /// - [`RagError::Model`] for any model failure, unchanged.
    pub async fn answer(&self, question: &str, results: Vec<SearchResult>) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(RagError::NoContext("question is empty".into()));
        }
        if results.is_empty() {
            return Err(RagError::NoContext(
                "the document has no text that could be retrieved for this question".into(),
            ));
        }

        let request = self.build_request(question, &results);
        let response = self.model.complete(request).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "answer generation failed");
            RagError::Model(e)
        })?;

        info!(
            model = %response.model,
            context_chunks = results.len(),
            answer_len = response.text.len(),
            "answer generated"
        );

        Ok(Answer { text: response.text, model: response.model, sources: results })
    }
}
