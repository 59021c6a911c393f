//! OpenAI-compatible chat-completions client.
//!
//! Talks to any service exposing `POST {base_url}/chat/completions` with
//! bearer authentication. [`OpenAIConfig::groq`] targets Groq, which is the
//! default backend for askpdf.
//!
//! # Example
//!
//! ```rust,ignore
//! use askpdf_model::openai::{OpenAIClient, OpenAIConfig};
//!
//! // Groq with the default model
//! let groq = OpenAIClient::new(OpenAIConfig::groq(std::env::var("GROQ_API_KEY").ok()))?;
//!
//! // Any other compatible endpoint
//! let local = OpenAIClient::new(OpenAIConfig::compatible(
//!     Some("unused".into()),
//!     "http://localhost:11434/v1",
//!     "llama3.1",
//! ))?;
//! ```

mod client;
mod config;

pub use client::OpenAIClient;
pub use config::{DEFAULT_GROQ_MODEL, DEFAULT_TIMEOUT, GROQ_API_BASE, OpenAIConfig};
