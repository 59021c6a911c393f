//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-answer workflow by
//! composing a [`PdfLoader`], a [`Chunker`], an [`EmbeddingProvider`] and an
//! [`Answerer`] around a [`ChatModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use askpdf_rag::{HashingEmbeddingProvider, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .chat_model(Arc::new(model))
//!     .build()?;
//!
//! let index = pipeline.index_pdf("report.pdf", &bytes).await?;
//! let answer = pipeline.ask(&index, "What was the revenue?").await?;
//! ```

use std::sync::Arc;

use askpdf_model::ChatModel;
use tracing::{debug, error, info};

use crate::answer::{Answer, Answerer};
use crate::chunking::{CharacterTextSplitter, Chunker};
use crate::config::RagConfig;
use crate::document::{Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::DocumentIndex;
use crate::loader::PdfLoader;

/// The RAG pipeline orchestrator.
///
/// Document ingestion runs load → chunk → embed → index. Questions run
/// embed → search → filter → answer. Construct one via [`RagPipeline::builder()`].
///
/// The pipeline holds no per-document state; each [`DocumentIndex`] it builds
/// is an independent value owned by the caller.
pub struct RagPipeline {
    config: RagConfig,
    loader: PdfLoader,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    answerer: Answerer,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the chat model used for answers.
    pub fn chat_model(&self) -> &Arc<dyn ChatModel> {
        self.answerer.model()
    }

    /// Extract the text of a PDF.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidDocument`] if `bytes` is not a readable PDF.
    pub fn load_pdf(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        self.loader.load(name, bytes)
    }

    /// Chunk and embed a document into a fresh [`DocumentIndex`].
    ///
    /// A document without text yields an empty index, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails or returns a
    /// wrong number of vectors, and [`RagError::IndexError`] on inconsistent
    /// vector dimensions.
    pub async fn build_index(&self, document: &Document) -> Result<DocumentIndex> {
        let mut chunks = self.chunker.chunk(document);
        let dimensions = self.embedding_provider.dimensions();

        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "indexed document (no text)");
            return DocumentIndex::from_chunks(&document.id, &document.name, dimensions, chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during indexing");
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::EmbeddingError {
                provider: self.embedding_provider.name().to_string(),
                message: format!(
                    "expected {} embeddings for document '{}', got {}",
                    chunks.len(),
                    document.id,
                    embeddings.len()
                ),
            });
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let index = DocumentIndex::from_chunks(&document.id, &document.name, dimensions, chunks)?;
        info!(
            document.id = %document.id,
            document.name = %document.name,
            chunk_count = index.len(),
            dimensions,
            "indexed document"
        );
        Ok(index)
    }

    /// [`load_pdf`](Self::load_pdf) followed by [`build_index`](Self::build_index).
    pub async fn index_pdf(&self, name: &str, bytes: &[u8]) -> Result<DocumentIndex> {
        let document = self.load_pdf(name, bytes)?;
        self.build_index(&document).await
    }

    /// Fetch the chunks most similar to `question`, best first.
    ///
    /// At most `top_k` results are returned. Results scoring below the
    /// configured `similarity_threshold` are dropped. A blank question or an
    /// empty index yields no results.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the question cannot be embedded.
    pub async fn retrieve(&self, index: &DocumentIndex, question: &str) -> Result<Vec<SearchResult>> {
        if question.trim().is_empty() || index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedding_provider.embed(question).await.map_err(|e| {
            error!(error = %e, "embedding failed during retrieval");
            e
        })?;

        let results = index.search(&query_embedding, self.config.top_k)?;
        let results: Vec<SearchResult> = match self.config.similarity_threshold {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        debug!(
            document.id = index.document_id(),
            result_count = results.len(),
            top_score = results.first().map(|r| r.score),
            "retrieval completed"
        );
        Ok(results)
    }

    /// Generate an answer from already retrieved chunks.
    pub async fn answer(&self, question: &str, results: Vec<SearchResult>) -> Result<Answer> {
        self.answerer.answer(question, results).await
    }

    /// Answer `question` against `index`.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoContext`] for a blank question or when nothing is
    ///   retrieved; the chat model is not called.
    /// - [`RagError::Model`] when the chat model fails.
    pub async fn ask(&self, index: &DocumentIndex, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(RagError::NoContext("question is empty".into()));
        }
        let results = self.retrieve(index, question).await?;
        self.answer(question, results).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider` and `chat_model` are required. Without an
/// explicit chunker a [`CharacterTextSplitter`] is built from the config.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .chat_model(Arc::new(model))
///     .chunker(Arc::new(FixedSizeChunker::new(500, 50)))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chat_model: Option<Arc<dyn ChatModel>>,
    chunker: Option<Arc<dyn Chunker>>,
    system_prompt: Option<String>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the chat model that writes answers.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the answer system prompt. `{context}` marks where chunks go.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let chat_model = self
            .chat_model
            .ok_or_else(|| RagError::ConfigError("chat_model is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(CharacterTextSplitter::new(
                config.separator.clone(),
                config.chunk_size,
                config.chunk_overlap,
            ))
        });

        let mut answerer = Answerer::new(chat_model);
        if let Some(prompt) = self.system_prompt {
            answerer = answerer.with_system_prompt(prompt);
        }

        Ok(RagPipeline { config, loader: PdfLoader::new(), chunker, embedding_provider, answerer })
    }
}

#[cfg(test)]
mod tests {
    use askpdf_model::{MockChatModel, ModelError, OpenAIClient, OpenAIConfig};

    use super::*;
    use crate::error::ErrorKind;
    use crate::hashing::HashingEmbeddingProvider;
    use crate::test_util::pdf_with_pages;

    fn pipeline_with(model: Arc<dyn ChatModel>) -> RagPipeline {
        RagPipeline::builder()
            .config(RagConfig::builder().chunk_size(60).chunk_overlap(10).top_k(2).build().unwrap())
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .chat_model(model)
            .build()
            .unwrap()
    }

    fn three_page_pdf() -> Vec<u8> {
        pdf_with_pages(&[
            "The warranty period is two years from purchase.",
            "Batteries must be recycled at a certified facility.",
            "Support is reachable by email on weekdays.",
        ])
    }

    #[tokio::test]
    async fn answers_a_question_about_a_three_page_pdf() {
        let model = Arc::new(MockChatModel::new("Two years."));
        let pipeline = pipeline_with(model.clone());

        let index = pipeline.index_pdf("manual.pdf", &three_page_pdf()).await.unwrap();
        assert_eq!(index.document_name(), "manual.pdf");
        assert!(index.len() >= 3);

        let answer = pipeline.ask(&index, "How long is the warranty period?").await.unwrap();
        assert_eq!(answer.text, "Two years.");
        assert!(!answer.sources.is_empty() && answer.sources.len() <= 2);
        assert!(answer.sources[0].chunk.text.contains("warranty"));

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].messages[0].content.contains("warranty period is two years"));
        assert_eq!(requests[0].messages[1].content, "How long is the warranty period?");
    }

    #[tokio::test]
    async fn three_page_pdf_of_2500_chars_gives_four_chunks() {
        let pipeline = RagPipeline::builder()
            .config(RagConfig::default())
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .chat_model(Arc::new(MockChatModel::new("ok")))
            .build()
            .unwrap();

        // Whatever the extractor adds around each page counts towards the 2500.
        let added =
            pipeline.load_pdf("m.pdf", &pdf_with_pages(&["a", "b", "c"])).unwrap().char_count() - 3;
        let pages = ["a".repeat(1200), "b".repeat(800), "c".repeat(500 - added)];
        let bytes = pdf_with_pages(&pages);

        let document = pipeline.load_pdf("long.pdf", &bytes).unwrap();
        assert_eq!(document.page_count, 3);
        assert_eq!(document.char_count(), 2500);

        let index = pipeline.index_pdf("long.pdf", &bytes).await.unwrap();
        assert_eq!(index.len(), 4);
        let chunks = index.chunks();
        assert_eq!(chunks[0].text, "a".repeat(1000));
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 1000));
        assert!(chunks.last().unwrap().text.ends_with('c'));
        let positions: Vec<usize> = chunks.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn retrieval_is_deterministic() {
        let pipeline = pipeline_with(Arc::new(MockChatModel::new("ok")));
        let bytes = three_page_pdf();

        let first = pipeline.index_pdf("a.pdf", &bytes).await.unwrap();
        let second = pipeline.index_pdf("a.pdf", &bytes).await.unwrap();
        let a = pipeline.retrieve(&first, "recycled batteries").await.unwrap();
        let b = pipeline.retrieve(&second, "recycled batteries").await.unwrap();

        let texts = |r: &[SearchResult]| r.iter().map(|s| s.chunk.text.clone()).collect::<Vec<_>>();
        assert_eq!(texts(&a), texts(&b));
        assert!(a[0].chunk.text.contains("Batteries"));
    }

    #[tokio::test]
    async fn a_new_index_does_not_see_the_previous_document() {
        let pipeline = pipeline_with(Arc::new(MockChatModel::echo()));

        let _old = pipeline.index_pdf("old.pdf", &three_page_pdf()).await.unwrap();
        let new = pipeline
            .index_pdf("new.pdf", &pdf_with_pages(&["Invoices are due in thirty days."]))
            .await
            .unwrap();

        let answer = pipeline.ask(&new, "When is the warranty over?").await.unwrap();
        assert!(answer.sources.iter().all(|s| !s.chunk.text.contains("warranty")));
        assert!(answer.text.contains("Invoices are due"));
    }

    #[tokio::test]
    async fn pdf_without_text_gives_no_context() {
        let model = Arc::new(MockChatModel::new("unused"));
        let pipeline = pipeline_with(model.clone());

        let index =
            pipeline.index_pdf("scan.pdf", &crate::test_util::pdf_without_text(2)).await.unwrap();
        assert!(index.is_empty());

        let err = pipeline.ask(&index, "Anything?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContext);
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn invalid_pdf_is_rejected_before_embedding() {
        let pipeline = pipeline_with(Arc::new(MockChatModel::new("unused")));
        let err = pipeline.index_pdf("notes.txt", b"just some text").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDocument);
    }

    #[tokio::test]
    async fn missing_credential_fails_without_a_network_call() {
        // Unroutable base URL: reaching the network would surface as Unavailable.
        let client = OpenAIClient::new(
            OpenAIConfig::groq(None::<String>).with_base_url("http://192.0.2.1:9/v1"),
        )
        .unwrap();
        let pipeline = pipeline_with(Arc::new(client));

        let index = pipeline.index_pdf("manual.pdf", &three_page_pdf()).await.unwrap();
        let err = pipeline.ask(&index, "How long is the warranty?").await.unwrap_err();
        assert!(matches!(err, RagError::Model(ModelError::MissingCredential { .. })));
        assert_eq!(err.kind(), ErrorKind::Credential);
    }

    #[tokio::test]
    async fn threshold_filters_weak_matches() {
        let pipeline = RagPipeline::builder()
            .config(RagConfig::builder().similarity_threshold(0.99).build().unwrap())
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .chat_model(Arc::new(MockChatModel::new("unused")))
            .build()
            .unwrap();

        let document = Document::new("doc", "doc.pdf", "apples and pears\nengines and gears");
        let index = pipeline.build_index(&document).await.unwrap();
        let results = pipeline.retrieve(&index, "quantum chromodynamics").await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn builder_requires_a_chat_model() {
        let err = RagPipeline::builder()
            .config(RagConfig::default())
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RagError::ConfigError(msg) if msg.contains("chat_model")));
    }
}
