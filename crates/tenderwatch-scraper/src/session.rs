//! Scrape session owning the run's accumulated state.
//!
//! The session is the single writer of the [`RunResult`] under construction
//! and the only user of the download directory. Every operation is awaited
//! before the next begins, so at most one download is ever in flight.

use crate::download::DownloadDir;
use crate::error::Result;
use crate::gate;
use crate::navigator::navigate_with_retry;
use std::path::PathBuf;
use tenderwatch_browser::BrowserActions;
use tenderwatch_core::{Diagnostic, PortalConfig, RunResult, ScrapingConfig};

/// One pass over the listing: navigate, locate the category, extract pages.
pub struct ScrapeSession<'a, D: BrowserActions + ?Sized> {
    pub(crate) driver: &'a D,
    pub(crate) portal: &'a PortalConfig,
    pub(crate) config: &'a ScrapingConfig,
    pub(crate) downloads: DownloadDir,
    pub(crate) result: RunResult,
}

impl<'a, D: BrowserActions + ?Sized> ScrapeSession<'a, D> {
    pub fn new(
        driver: &'a D,
        portal: &'a PortalConfig,
        config: &'a ScrapingConfig,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            driver,
            portal,
            config,
            downloads: DownloadDir::new(download_dir),
            result: RunResult::new(),
        }
    }

    /// Run the extraction and return the accumulated result.
    ///
    /// Only navigation exhaustion and an unreachable category are errors;
    /// everything else is recorded as a diagnostic.
    pub async fn run(mut self) -> Result<RunResult> {
        if let Err(e) = self.downloads.ensure().await {
            tracing::warn!(
                "Could not create download directory {}: {}",
                self.downloads.path().display(),
                e
            );
        }

        navigate_with_retry(
            self.driver,
            &self.portal.url,
            self.config.navigation_retries,
            self.config.navigation_delay(),
        )
        .await?;

        self.locate_category().await?;
        self.walk_pages().await;

        self.result.finished_at = Some(chrono::Utc::now());
        tracing::info!(
            "Extraction finished: {} records, {} diagnostics",
            self.result.records.len(),
            self.result.diagnostics.len()
        );
        Ok(self.result)
    }

    /// Best-effort wait for the loading overlay to clear.
    pub(crate) async fn await_stable(&self) -> bool {
        gate::await_stable(
            self.driver,
            &self.portal.selectors.loading_overlay,
            self.config.gate_timeout(),
            self.config.poll_interval(),
        )
        .await
    }

    /// Wait for an element within the element timeout.
    pub(crate) async fn wait_for(&self, xpath: &str) -> bool {
        gate::wait_for_element(
            self.driver,
            xpath,
            self.config.element_timeout(),
            self.config.poll_interval(),
        )
        .await
    }

    pub(crate) fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("Skipped: {}", diagnostic);
        self.result.diagnostics.push(diagnostic);
    }
}
