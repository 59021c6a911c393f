//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` takes precedence over the built-in filter:
//! ```bash
//! RUST_LOG=askpdf=debug,askpdf_rag=debug askpdf serve
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str =
    "askpdf=info,askpdf_server=info,askpdf_rag=info,askpdf_model=info,tower_http=info";

/// Install the global subscriber. Logs go to stderr so `askpdf ask` output stays clean.
pub fn init(json: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true).with_writer(std::io::stderr)).try_init()?;
    }
    Ok(())
}
