//! # askpdf-rag
//!
//! Retrieval-augmented question answering over a single PDF.
//!
//! The pipeline is linear: load PDF text → split into overlapping chunks →
//! embed every chunk into a [`DocumentIndex`] → embed the question and fetch
//! the top-K chunks → hand them to a [`ChatModel`](askpdf_model::ChatModel)
//! for the final answer.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askpdf_rag::{FastEmbedProvider, RagConfig, RagPipeline};
//! use askpdf_model::{OpenAIClient, OpenAIConfig};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(FastEmbedProvider::new()?))
//!     .chat_model(Arc::new(OpenAIClient::new(OpenAIConfig::groq(api_key))?))
//!     .build()?;
//!
//! let document = pipeline.load_pdf("report.pdf", &bytes)?;
//! let index = pipeline.build_index(&document).await?;
//! let answer = pipeline.ask(&index, "What was the revenue in 2023?").await?;
//! println!("{}", answer.text);
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "fastembed")]
pub mod fastembed;
pub mod hashing;
pub mod index;
pub mod loader;
pub mod pipeline;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use answer::{Answer, Answerer, DEFAULT_SYSTEM_PROMPT};
pub use chunking::{CharacterTextSplitter, Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{ErrorKind, RagError, Result};
#[cfg(feature = "fastembed")]
pub use fastembed::FastEmbedProvider;
pub use hashing::HashingEmbeddingProvider;
pub use index::DocumentIndex;
pub use loader::PdfLoader;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
