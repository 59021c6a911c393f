//! Error types for the `askpdf-rag` crate.

use askpdf_model::ModelError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while loading, indexing, retrieving or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded bytes are not a readable PDF.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The index rejected a chunk or a query vector.
    #[error("Index error: {0}")]
    IndexError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The question is empty or nothing relevant could be retrieved.
    #[error("No context: {0}")]
    NoContext(String),

    /// An error propagated from the chat model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Coarse classification of a [`RagError`], for deciding what to show a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or unreadable PDF.
    InvalidDocument,
    /// Missing or rejected service credential.
    Credential,
    /// Remote service timed out or is unavailable.
    Unavailable,
    /// Empty question, or a document with no retrievable text.
    NoContext,
    /// The model declined to answer.
    Declined,
    /// Everything else: embedding, index, configuration and protocol faults.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDocument => "invalid_document",
            Self::Credential => "credential",
            Self::Unavailable => "unavailable",
            Self::NoContext => "no_context",
            Self::Declined => "declined",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RagError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDocument(_) => ErrorKind::InvalidDocument,
            Self::NoContext(_) => ErrorKind::NoContext,
            Self::Model(e) if e.is_credential() => ErrorKind::Credential,
            Self::Model(e) if e.is_transient() => ErrorKind::Unavailable,
            Self::Model(ModelError::Declined { .. }) => ErrorKind::Declined,
            Self::Model(_)
            | Self::EmbeddingError { .. }
            | Self::IndexError(_)
            | Self::ConfigError(_) => ErrorKind::Internal,
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_kinds() {
        let missing = RagError::from(ModelError::MissingCredential { provider: "Groq".into() });
        assert_eq!(missing.kind(), ErrorKind::Credential);

        let rejected = RagError::from(ModelError::Unauthorized {
            provider: "Groq".into(),
            status: 401,
            message: "bad key".into(),
        });
        assert_eq!(rejected.kind(), ErrorKind::Credential);

        let down =
            RagError::from(ModelError::Unavailable { provider: "Groq".into(), message: "503".into() });
        assert_eq!(down.kind(), ErrorKind::Unavailable);

        let declined =
            RagError::from(ModelError::Declined { provider: "Groq".into(), reason: "no".into() });
        assert_eq!(declined.kind(), ErrorKind::Declined);

        let api = RagError::from(ModelError::Api {
            provider: "Groq".into(),
            status: 400,
            message: "bad request".into(),
        });
        assert_eq!(api.kind(), ErrorKind::Internal);
    }

    #[test]
    fn local_errors_map_to_kinds() {
        assert_eq!(RagError::InvalidDocument("x".into()).kind(), ErrorKind::InvalidDocument);
        assert_eq!(RagError::NoContext("x".into()).kind(), ErrorKind::NoContext);
        assert_eq!(RagError::ConfigError("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(ErrorKind::NoContext.to_string(), "no_context");
    }
}
