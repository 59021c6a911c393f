//! Application configuration assembled by the CLI.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use askpdf_model::{DEFAULT_GROQ_MODEL, GROQ_API_BASE, OpenAIClient, OpenAIConfig};
use askpdf_rag::{EmbeddingProvider, HashingEmbeddingProvider, RagConfig, RagPipeline};
use clap::ValueEnum;
use tracing::info;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_SESSION_TTL_MINS: u64 = 60;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(DEFAULT_SESSION_TTL_MINS * 60);

/// Which embedding backend indexes documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// all-MiniLM-L6-v2 via fastembed, run locally.
    Fastembed,
    /// Feature-hashed bag of words. No model download.
    Hashing,
}

impl Default for EmbedderKind {
    fn default() -> Self {
        if cfg!(feature = "fastembed") { Self::Fastembed } else { Self::Hashing }
    }
}

/// Everything the binary needs, resolved from flags, environment and `.env`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub session_ttl: Duration,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub embedder: EmbedderKind,
    pub rag: RagConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            session_ttl: DEFAULT_SESSION_TTL,
            api_key: None,
            model: DEFAULT_GROQ_MODEL.to_string(),
            base_url: GROQ_API_BASE.to_string(),
            timeout: askpdf_model::DEFAULT_TIMEOUT,
            temperature: None,
            embedder: EmbedderKind::default(),
            rag: RagConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid host/port {}:{}", self.host, self.port))
    }

    pub fn openai_config(&self) -> OpenAIConfig {
        let config = OpenAIConfig::groq(self.api_key.clone())
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout);
        match self.temperature {
            Some(temperature) => config.with_temperature(temperature),
            None => config,
        }
    }

    pub fn embedding_provider(&self) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
        match self.embedder {
            EmbedderKind::Hashing => Ok(Arc::new(HashingEmbeddingProvider::default())),
            #[cfg(feature = "fastembed")]
            EmbedderKind::Fastembed => {
                let provider = askpdf_rag::FastEmbedProvider::new()
                    .context("failed to load the fastembed model")?;
                Ok(Arc::new(provider))
            }
            #[cfg(not(feature = "fastembed"))]
            EmbedderKind::Fastembed => {
                anyhow::bail!("built without the `fastembed` feature; use --embedder hashing")
            }
        }
    }

    /// Build the pipeline. Loads the embedding model, so this can block for a while.
    pub fn build_pipeline(&self) -> anyhow::Result<RagPipeline> {
        let model = OpenAIClient::new(self.openai_config())?;
        let embedder = self.embedding_provider()?;
        info!(
            model = %self.model,
            embedder = embedder.name(),
            dimensions = embedder.dimensions(),
            chunk_size = self.rag.chunk_size,
            chunk_overlap = self.rag.chunk_overlap,
            top_k = self.rag.top_k,
            credential = self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty()),
            "pipeline configured"
        );
        let pipeline = RagPipeline::builder()
            .config(self.rag.clone())
            .embedding_provider(embedder)
            .chat_model(Arc::new(model))
            .build()?;
        Ok(pipeline)
    }
}
