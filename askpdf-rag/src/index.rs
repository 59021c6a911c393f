//! In-memory similarity index over one document's chunks.
//!
//! A [`DocumentIndex`] is an immutable value: it is built once from a document's
//! embedded chunks, queried any number of times, and dropped when the document
//! is replaced.

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the result is NaN.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b);
    if score.is_nan() { 0.0 } else { score }
}

/// Embedded chunks of a single document, searchable by cosine similarity.
///
/// # Example
///
/// ```rust,ignore
/// let index = DocumentIndex::from_chunks("doc", "doc.pdf", 384, chunks)?;
/// let top = index.search(&query_embedding, 4)?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    document_id: String,
    document_name: String,
    dimensions: usize,
    chunks: Vec<Chunk>,
}

impl DocumentIndex {
    /// Build an index from chunks that already carry embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if any chunk's embedding is not exactly
    /// `dimensions` long.
    pub fn from_chunks(
        document_id: impl Into<String>,
        document_name: impl Into<String>,
        dimensions: usize,
        chunks: Vec<Chunk>,
    ) -> Result<Self> {
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != dimensions) {
            return Err(RagError::IndexError(format!(
                "chunk '{}' has an embedding of length {}, expected {dimensions}",
                bad.id,
                bad.embedding.len()
            )));
        }
        Ok(Self {
            document_id: document_id.into(),
            document_name: document_name.into(),
            dimensions,
            chunks,
        })
    }

    /// Return the `top_k` chunks most similar to `embedding`.
    ///
    /// Results are ordered by descending score; equal scores keep document order.
    /// An empty index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if the query has the wrong dimensionality.
    pub fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        if embedding.len() != self.dimensions {
            return Err(RagError::IndexError(format!(
                "query embedding has length {}, expected {}",
                embedding.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                score: cosine_similarity(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score.total_cmp(&a.score).then(a.chunk.position.cmp(&b.chunk.position))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Indexed chunks in document order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
