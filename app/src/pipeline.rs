//! Scrape, match, report and notify, in that order.

use tenderwatch_browser::BrowserActions;
use tenderwatch_core::{AppConfig, RunResult};
use tenderwatch_mail::{body_hash, Notification, Notifier};
use tenderwatch_report::ReportBuilder;
use tenderwatch_scraper::{KeywordMatcher, ScrapeError, ScrapeSession};
use tracing::{error, info, warn};

/// Process exit codes
pub const EXIT_OK: u8 = 0;
pub const EXIT_SCRAPE_FAILED: u8 = 1;
pub const EXIT_STARTUP: u8 = 2;

/// What a completed run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub result: RunResult,
    pub report_written: bool,
    pub notification: Notification,
    pub notified: bool,
}

impl PipelineOutcome {
    pub fn exit_code(&self) -> u8 {
        if self.report_written {
            EXIT_OK
        } else {
            EXIT_SCRAPE_FAILED
        }
    }
}

/// Run one full pass against `driver`.
///
/// Only a fatal scrape error is returned; in that case nothing is written or
/// sent. Report and delivery failures are logged and reflected in the outcome.
pub async fn run_pipeline<D>(
    driver: &D,
    config: &AppConfig,
    notifier: Option<&dyn Notifier>,
) -> Result<PipelineOutcome, ScrapeError>
where
    D: BrowserActions + ?Sized,
{
    let result = ScrapeSession::new(
        driver,
        &config.portal,
        &config.scraping,
        config.output.download_dir.clone(),
    )
    .run()
    .await
    .inspect_err(|e| error!("Scrape aborted: {}", e))?;

    let matcher = KeywordMatcher::new(config.keywords.terms.as_slice());
    let result = matcher.apply(result);
    info!(
        "{} records, {} matches, {} evidence files, {} skipped items",
        result.records.len(),
        result.matches.len(),
        result.evidence.len(),
        result.diagnostics.len()
    );

    let report_path = &config.output.report_path;
    let report_written = match ReportBuilder::new(&result).save(report_path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Report could not be written to {}: {}", report_path.display(), e);
            false
        }
    };

    let mut notification =
        Notification::compose(&result, report_path, &config.notification.subject_prefix);
    if !report_written {
        notification.attachments.retain(|p| p != report_path);
    }

    let notified = match notifier {
        Some(notifier) => match notifier.notify(&notification).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notification not delivered: {}", e);
                false
            }
        },
        None => {
            info!(
                "Notification not sent: '{}' with {} attachments (body sha256 {})",
                notification.subject,
                notification.attachments.len(),
                body_hash(&notification.html_body)
            );
            false
        }
    };

    Ok(PipelineOutcome {
        result,
        report_written,
        notification,
        notified,
    })
}
