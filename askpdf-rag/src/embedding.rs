//! Turning chunk text and questions into vectors for the document index.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to a fixed-length vector so questions can be compared with chunks.
///
/// The same provider must embed a document's chunks and every question asked
/// about it, otherwise scores are meaningless. `FastEmbedProvider` runs
/// all-MiniLM-L6-v2 locally; [`HashingEmbeddingProvider`](crate::HashingEmbeddingProvider)
/// needs no model download and is what the tests use.
///
/// # Example
///
/// ```rust,ignore
/// use askpdf_rag::{EmbeddingProvider, HashingEmbeddingProvider};
///
/// let provider = HashingEmbeddingProvider::new(256);
/// let question = provider.embed("How long is the warranty?").await?;
/// assert_eq!(question.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one question or chunk.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed every chunk of a document in one call.
    ///
    /// Returns one vector per input, in input order; the pipeline rejects a
    /// provider that breaks this. Falls back to one [`embed`](Self::embed) call
    /// per chunk.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// A short name for logs and errors.
    fn name(&self) -> &str;
}
