//! Row extraction and download correlation for one result page.

use crate::download::pick_new_file;
use crate::session::ScrapeSession;
use tenderwatch_browser::BrowserActions;
use tenderwatch_core::{Diagnostic, SkipReason, TenderRecord};

pub const COL_SERIAL: usize = 0;
pub const COL_TENDER: usize = 1;
pub const COL_DETAILS: usize = 2;
pub const COL_DOCUMENTS: usize = 3;
pub const COL_ADVERTISED: usize = 4;
pub const COL_CLOSING: usize = 5;
/// Cells a row needs before it is treated as a tender
pub const MIN_COLUMNS: usize = 6;

/// Anchor target of download affordances that do nothing
const NO_OP_HREF: &str = "javascript:void(0)";
/// Link text the listing appends to tender numbers
const INVOICE_LABEL: &str = "View Invoice";

/// Build a record from a row's cell texts, or `None` if the row is too short.
pub fn parse_cells(cells: &[String]) -> Option<TenderRecord> {
    if cells.len() < MIN_COLUMNS {
        return None;
    }

    Some(TenderRecord::new(
        cells[COL_SERIAL].trim(),
        cells[COL_TENDER].replace(INVOICE_LABEL, "").trim(),
        cells[COL_DETAILS].trim(),
        cells[COL_ADVERTISED].trim(),
        cells[COL_CLOSING].trim(),
    ))
}

enum RowRead {
    Record(TenderRecord),
    TooShort(usize),
    Failed { attempts: u32, error: String },
}

impl<D: BrowserActions + ?Sized> ScrapeSession<'_, D> {
    /// Extract every row on the current page and return the new records.
    pub(crate) async fn extract_page(&mut self, page: u32) -> &[TenderRecord] {
        let start = self.result.records.len();
        self.await_stable().await;

        let rows = match self.driver.count(&self.portal.selectors.rows).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Could not count rows on page {}: {}", page, e);
                0
            }
        };
        tracing::debug!("Page {}: {} rows", page, rows);

        for row in 1..=rows {
            // A download from the previous row can re-render the table
            if row > 1 {
                self.await_stable().await;
            }
            match self.read_row(row).await {
                RowRead::Record(record) => {
                    let mut record = record.on_page(page);
                    self.collect_documents(page, row, &mut record).await;
                    self.result.records.push(record);
                }
                RowRead::TooShort(cells) => {
                    self.record_diagnostic(Diagnostic::row(
                        page,
                        row,
                        SkipReason::RowTooShort { cells },
                    ));
                }
                RowRead::Failed { attempts, error } => {
                    self.record_diagnostic(Diagnostic::row(
                        page,
                        row,
                        SkipReason::RowReadFailed { attempts, error },
                    ));
                }
            }
        }

        &self.result.records[start..]
    }

    async fn read_row(&self, row: usize) -> RowRead {
        let xpath = self.portal.selectors.row_cells(row);
        let attempts = self.config.row_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.driver.texts(&xpath).await {
                Ok(cells) => {
                    return match parse_cells(&cells) {
                        Some(record) => RowRead::Record(record),
                        None => RowRead::TooShort(cells.len()),
                    };
                }
                Err(e) => {
                    tracing::debug!("Row {} read attempt {}/{} failed: {}", row, attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.config.row_retry_delay()).await;
                    }
                }
            }
        }

        RowRead::Failed {
            attempts,
            error: last_error,
        }
    }

    async fn collect_documents(&mut self, page: u32, row: usize, record: &mut TenderRecord) {
        let icons_xpath = self.portal.selectors.download_icons(row, COL_DOCUMENTS);
        let icons = match self.driver.count(&icons_xpath).await {
            Ok(n) => n,
            Err(e) => {
                let reason = SkipReason::DownloadTriggerFailed {
                    error: format!("could not count download links: {e}"),
                };
                self.record_diagnostic(Diagnostic::row(page, row, reason));
                return;
            }
        };
        if icons == 0 {
            return;
        }

        let Some(stem) = record.file_stem() else {
            self.record_diagnostic(Diagnostic::row(page, row, SkipReason::MissingTenderNumber));
            return;
        };

        for index in 1..=icons {
            if let Err(reason) = self.download_one(row, index, &stem, record).await {
                self.record_diagnostic(Diagnostic::row(page, row, reason));
            }
        }
    }

    /// Trigger one download and correlate the resulting file to `record`.
    async fn download_one(
        &self,
        row: usize,
        index: usize,
        stem: &str,
        record: &mut TenderRecord,
    ) -> Result<(), SkipReason> {
        let selectors = &self.portal.selectors;
        let link = selectors.download_link(row, COL_DOCUMENTS, index);
        let icon = selectors.download_icon(row, COL_DOCUMENTS, index);

        let href = self
            .driver
            .attribute(&link, "href")
            .await
            .map_err(|e| SkipReason::DownloadTriggerFailed {
                error: e.to_string(),
            })?;
        if href.as_deref().map(str::trim) == Some(NO_OP_HREF) {
            tracing::debug!("Row {} icon {} has no download target", row, index);
            return Ok(());
        }

        let existing = self.downloads.existing(stem).await.map_err(io_reason)?;
        if let Some(path) = existing {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            record.document.get_or_insert(path);
            return Err(SkipReason::DestinationExists { file });
        }

        let before = self.downloads.snapshot().await.map_err(io_reason)?;
        self.driver
            .click(&icon)
            .await
            .map_err(|e| SkipReason::DownloadTriggerFailed {
                error: e.to_string(),
            })?;

        let timeout = self.config.download_timeout();
        let new = self
            .downloads
            .wait_for_new(&before, timeout, self.config.download_poll())
            .await
            .map_err(io_reason)?;

        let file = match pick_new_file(new, self.config.multi_file_policy) {
            Ok(Some(file)) => file,
            Ok(None) => {
                return Err(SkipReason::DownloadTimedOut {
                    waited_secs: timeout.as_secs(),
                })
            }
            Err(files) => return Err(SkipReason::AmbiguousDownload { files }),
        };

        let path = self.downloads.adopt(&file, stem).await.map_err(io_reason)?;
        tracing::info!("Saved document for {} as {}", record.tender_number, path.display());
        record.document.get_or_insert(path);
        Ok(())
    }
}

fn io_reason(e: std::io::Error) -> SkipReason {
    SkipReason::DownloadIo {
        error: e.to_string(),
    }
}
