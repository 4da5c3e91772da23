use clap::Parser;
use std::path::PathBuf;

/// Scrape PPRA sector-wise tenders, flag keyword matches and mail a report.
#[derive(Debug, Parser)]
#[command(name = "tenderwatch", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Compose the notification but do not send it
    #[arg(long)]
    pub no_notify: bool,

    /// Write the spreadsheet report here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}
