//! # askpdf-model
//!
//! Chat model integrations for askpdf.
//!
//! ## Overview
//!
//! This crate provides the [`ChatModel`] trait used by the answer step and
//! the implementations behind it:
//!
//! - [`OpenAIClient`] - any OpenAI-compatible chat-completions API (Groq by default)
//! - [`MockChatModel`] - canned responses for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use askpdf_model::{ChatMessage, ChatModel, ChatRequest, OpenAIClient, OpenAIConfig};
//!
//! let model = OpenAIClient::new(OpenAIConfig::groq(Some("gsk-...".to_string())))?;
//! let response = model
//!     .complete(ChatRequest::new(vec![ChatMessage::user("Hello")]))
//!     .await?;
//! println!("{}", response.text);
//! ```
//!
//! ## Supported Models
//!
//! ### Groq
//! | Model | Description |
//! |-------|-------------|
//! | `llama-3.1-8b-instant` | Fast, inexpensive (default) |
//! | `llama-3.3-70b-versatile` | Higher quality answers |

pub mod error;
pub mod llm;
pub mod mock;
pub mod openai;

pub use error::{ModelError, Result};
pub use llm::{ChatMessage, ChatModel, ChatRequest, ChatResponse, Role, Usage};
pub use mock::MockChatModel;
pub use openai::{DEFAULT_GROQ_MODEL, DEFAULT_TIMEOUT, GROQ_API_BASE, OpenAIClient, OpenAIConfig};
