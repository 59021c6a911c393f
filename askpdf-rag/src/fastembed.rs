//! Local ONNX embeddings via `fastembed`.
//!
//! This module is only available when the `fastembed` feature is enabled
//! (on by default). The default model is `sentence-transformers/all-MiniLM-L6-v2`
//! (384 dimensions), downloaded to the fastembed cache on first use.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, error, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "fastembed";

fn embedding_error(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message: message.into() }
}

/// An [`EmbeddingProvider`] running a sentence-transformer model in-process.
///
/// Inference is CPU-bound and runs on tokio's blocking pool. `TextEmbedding`
/// needs `&mut self`, so the model sits behind a mutex and batches are serialized.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

impl FastEmbedProvider {
    /// Load `all-MiniLM-L6-v2`.
    ///
    /// Blocks while the model is downloaded and initialized.
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    /// Load a specific fastembed model.
    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let model_name = format!("{model:?}");
        let mut text_model =
            TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(false))
                .map_err(|e| {
                    error!(model = %model_name, error = %e, "failed to initialize embedding model");
                    embedding_error(format!("failed to initialize {model_name}: {e}"))
                })?;

        // Embed once to learn the dimensionality.
        let sample = text_model
            .embed(vec!["dimension check"], None)
            .map_err(|e| embedding_error(format!("sample embedding failed: {e}")))?;
        let dimensions = sample
            .into_iter()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| embedding_error("sample embedding returned nothing"))?;

        info!(model = %model_name, dimensions, "embedding model ready");

        Ok(Self { model: Arc::new(Mutex::new(text_model)), model_name, dimensions })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| embedding_error("model returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model_name, "embedding batch");

        let owned: Vec<String> = texts.iter().map(|s| (*s).to_string()).collect();
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|_| embedding_error("model mutex poisoned"))?;
            model.embed(owned, None).map_err(|e| embedding_error(format!("inference failed: {e}")))
        })
        .await
        .map_err(|e| embedding_error(format!("embedding task failed: {e}")))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
