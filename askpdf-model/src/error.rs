//! Error types for the `askpdf-model` crate.

use thiserror::Error;

/// Errors returned by [`ChatModel`](crate::ChatModel) implementations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// No API key was configured. Raised before any request is sent.
    #[error("Missing API key for {provider}")]
    MissingCredential {
        /// The provider that requires the key.
        provider: String,
    },

    /// The service rejected the configured API key.
    #[error("{provider} rejected the API key ({status}): {message}")]
    Unauthorized {
        /// The provider that rejected the key.
        provider: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Error detail reported by the service.
        message: String,
    },

    /// The request timed out, could not connect, or the service is overloaded.
    #[error("{provider} is unavailable: {message}")]
    Unavailable {
        /// The provider that could not be reached.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The model returned no usable answer (refusal, content filter, empty text).
    #[error("{provider} declined to answer: {reason}")]
    Declined {
        /// The provider whose model declined.
        provider: String,
        /// Why the completion was rejected.
        reason: String,
    },

    /// Any other non-success response.
    #[error("{provider} returned {status}: {message}")]
    Api {
        /// The provider that returned the error.
        provider: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Error detail reported by the service.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that produced the response.
        provider: String,
        /// A description of the decoding failure.
        message: String,
    },

    /// The client could not be constructed from its configuration.
    #[error("Invalid model configuration: {0}")]
    Config(String),
}

impl ModelError {
    /// Whether the error stems from a missing or rejected credential.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::MissingCredential { .. } | Self::Unauthorized { .. })
    }

    /// Whether the error is transient (timeout, connection failure, overload).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
