//! `askpdf-server` serves a single-page "Ask your PDF" UI over HTTP and
//! provides the `askpdf` command-line tool.

pub mod cli;
pub mod config;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod session;

pub use config::{AppConfig, EmbedderKind};
pub use server::{ApiError, AppState, ServerConfig, app_router, run_server};
