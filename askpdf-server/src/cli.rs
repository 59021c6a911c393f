//! Command-line interface for the `askpdf` binary.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use askpdf_model::{DEFAULT_GROQ_MODEL, GROQ_API_BASE};
use askpdf_rag::RagConfig;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::{
    AppConfig, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT, DEFAULT_SESSION_TTL_MINS,
    EmbedderKind,
};

#[derive(Parser, Debug)]
#[command(name = "askpdf", version, about = "Ask questions about a PDF")]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the web UI and HTTP API.
    Serve(ServeArgs),

    /// Answer questions about a PDF from the terminal.
    Ask(AskArgs),
}

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// API key for the chat model provider.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model name.
    #[arg(long, env = "ASKPDF_MODEL", default_value = DEFAULT_GROQ_MODEL)]
    pub model: String,

    /// Base URL of the OpenAI-compatible chat API.
    #[arg(long, env = "ASKPDF_BASE_URL", default_value = GROQ_API_BASE)]
    pub base_url: String,

    /// Chat request timeout in seconds.
    #[arg(long, env = "ASKPDF_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Sampling temperature for answers. Uses the model default when unset.
    #[arg(long, env = "ASKPDF_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Embedding backend.
    #[arg(long, env = "ASKPDF_EMBEDDER", value_enum, default_value_t = EmbedderKind::default())]
    pub embedder: EmbedderKind,

    /// Maximum chunk length in characters.
    #[arg(long, env = "ASKPDF_CHUNK_SIZE", default_value_t = 1000)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[arg(long, env = "ASKPDF_CHUNK_OVERLAP", default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question.
    #[arg(long, env = "ASKPDF_TOP_K", default_value_t = 4)]
    pub top_k: usize,
}

impl PipelineArgs {
    pub fn to_config(&self) -> anyhow::Result<AppConfig> {
        let rag = RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .build()?;
        Ok(AppConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            temperature: self.temperature,
            embedder: self.embedder,
            rag,
            ..AppConfig::default()
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "ASKPDF_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "ASKPDF_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest accepted upload, in megabytes.
    #[arg(long, env = "ASKPDF_MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: usize,

    /// Minutes a session may sit unused before it is dropped. 0 keeps sessions until closed.
    #[arg(long, env = "ASKPDF_SESSION_TTL_MINS", default_value_t = DEFAULT_SESSION_TTL_MINS)]
    pub session_ttl_mins: u64,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl ServeArgs {
    pub fn to_config(&self) -> anyhow::Result<AppConfig> {
        Ok(AppConfig {
            host: self.host.clone(),
            port: self.port,
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
            session_ttl: Duration::from_secs(self.session_ttl_mins.saturating_mul(60)),
            ..self.pipeline.to_config()?
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// The PDF to read.
    pub pdf: PathBuf,

    /// One or more questions, answered in order.
    #[arg(required = true)]
    pub questions: Vec<String>,

    /// Also print the chunks each answer was based on.
    #[arg(long)]
    pub sources: bool,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Index `args.pdf` once, then answer each question on stdout.
pub async fn run_ask(args: AskArgs) -> anyhow::Result<()> {
    let config = args.pipeline.to_config()?;
    let pipeline = config.build_pipeline()?;

    let bytes = tokio::fs::read(&args.pdf)
        .await
        .with_context(|| format!("failed to read {}", args.pdf.display()))?;
    let name = args
        .pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    let index = pipeline.index_pdf(&name, &bytes).await?;
    info!(document = %name, chunk_count = index.len(), "document ready");

    for question in &args.questions {
        let answer = pipeline
            .ask(&index, question)
            .await
            .with_context(|| format!("failed to answer {question:?}"))?;

        if args.questions.len() > 1 {
            println!("Q: {question}");
        }
        println!("{}", answer.text.trim_end());
        if args.sources {
            for source in &answer.sources {
                println!("  [chunk {} | score {:.3}]", source.chunk.position, source.score);
                for line in source.chunk.text.lines() {
                    println!("    {line}");
                }
            }
        }
        if args.questions.len() > 1 {
            println!();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_takes_a_path_and_several_questions() {
        let cli = Cli::try_parse_from([
            "askpdf",
            "ask",
            "report.pdf",
            "What is the revenue?",
            "Who is the CEO?",
            "--sources",
            "--embedder",
            "hashing",
            "--top-k",
            "2",
        ])
        .unwrap();

        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.pdf, PathBuf::from("report.pdf"));
        assert_eq!(args.questions, vec!["What is the revenue?", "Who is the CEO?"]);
        assert!(args.sources);

        let config = args.pipeline.to_config().unwrap();
        assert_eq!(config.embedder, EmbedderKind::Hashing);
        assert_eq!(config.rag.top_k, 2);
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["askpdf", "ask", "report.pdf"]).is_err());
    }

    #[test]
    fn serve_flags() {
        let cli = Cli::try_parse_from([
            "askpdf",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--max-upload-mb",
            "2",
            "--chunk-size",
            "500",
            "--chunk-overlap",
            "50",
            "--session-ttl-mins",
            "5",
            "--temperature",
            "0.5",
            "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);

        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:9000");
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(config.rag.chunk_size, 500);
        assert_eq!(config.rag.chunk_overlap, 50);
        assert_eq!(config.session_ttl, Duration::from_secs(300));
        assert_eq!(config.temperature, Some(0.5));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let cli = Cli::try_parse_from([
            "askpdf",
            "serve",
            "--chunk-size",
            "100",
            "--chunk-overlap",
            "100",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let err = args.to_config().unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[tokio::test]
    async fn ask_reports_an_unreadable_pdf() {
        let cli = Cli::try_parse_from([
            "askpdf",
            "ask",
            "/definitely/not/here.pdf",
            "Anything?",
            "--embedder",
            "hashing",
        ])
        .unwrap();
        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        let err = run_ask(args).await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
