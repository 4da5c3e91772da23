//! Tenderwatch application shell
//!
//! Command-line parsing, logging setup and the end-to-end pipeline. Scraping,
//! reporting and delivery live in the `crates/` directory.

pub mod cli;
pub mod pipeline;

pub use cli::Cli;
pub use pipeline::{run_pipeline, PipelineOutcome, EXIT_OK, EXIT_SCRAPE_FAILED, EXIT_STARTUP};

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tenderwatch=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
