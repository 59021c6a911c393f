//! JSON bodies exchanged with the browser UI.

use askpdf_rag::{Answer, DocumentIndex, SearchResult};
use serde::{Deserialize, Serialize};

pub type SessionId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateResponse {
    pub session_id: SessionId,
}

/// Query string of a document upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub document_id: String,
    pub name: String,
    pub page_count: usize,
    pub chunk_count: usize,
    pub char_count: usize,
}

impl DocumentResponse {
    pub fn new(index: &DocumentIndex, page_count: usize, char_count: usize) -> Self {
        Self {
            document_id: index.document_id().to_string(),
            name: index.document_name().to_string(),
            page_count,
            chunk_count: index.len(),
            char_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceChunk {
    pub chunk_index: usize,
    pub score: f32,
    pub text: String,
}

impl From<SearchResult> for SourceChunk {
    fn from(result: SearchResult) -> Self {
        Self { chunk_index: result.chunk.position, score: result.score, text: result.chunk.text }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub model: String,
    pub sources: Vec<SourceChunk>,
}

impl From<Answer> for AskResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            model: answer.model,
            sources: answer.sources.into_iter().map(SourceChunk::from).collect(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
