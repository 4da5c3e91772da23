//! Recoverable problems recorded during extraction.
//!
//! Nothing below a fatal error is surfaced to the pipeline caller. Each skip
//! becomes a [`Diagnostic`] in the run result so partial data loss stays
//! observable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a row, download or page was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Reading the row failed on every attempt
    RowReadFailed {
        /// Attempts made
        attempts: u32,
        /// Last driver error
        error: String,
    },
    /// The row had fewer cells than the listing layout requires
    RowTooShort {
        /// Cells found
        cells: usize,
    },
    /// The row had no tender number, so no download was attempted
    MissingTenderNumber,
    /// Clicking the download affordance failed
    DownloadTriggerFailed {
        /// Driver error
        error: String,
    },
    /// No new file appeared within the wait window
    DownloadTimedOut {
        /// Seconds waited
        waited_secs: u64,
    },
    /// More than one new file appeared and the policy rejects ambiguity
    AmbiguousDownload {
        /// New file names observed
        files: Vec<String>,
    },
    /// A document for this tender number already exists
    DestinationExists {
        /// Existing file name
        file: String,
    },
    /// Listing or renaming in the download directory failed
    DownloadIo {
        /// I/O error
        error: String,
    },
    /// The results "Next" affordance was missing before the last page
    PaginationEndedEarly {
        /// Total pages reported by the listing
        total_pages: u32,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowReadFailed { attempts, error } => {
                write!(f, "row read failed after {attempts} attempts: {error}")
            }
            Self::RowTooShort { cells } => write!(f, "row has only {cells} cells"),
            Self::MissingTenderNumber => write!(f, "row has no tender number"),
            Self::DownloadTriggerFailed { error } => write!(f, "download trigger failed: {error}"),
            Self::DownloadTimedOut { waited_secs } => {
                write!(f, "no download appeared within {waited_secs}s")
            }
            Self::AmbiguousDownload { files } => {
                write!(f, "ambiguous download: {} new files", files.len())
            }
            Self::DestinationExists { file } => write!(f, "document already present: {file}"),
            Self::DownloadIo { error } => write!(f, "download directory error: {error}"),
            Self::PaginationEndedEarly { total_pages } => {
                write!(f, "next page missing before page {total_pages}")
            }
        }
    }
}

/// A skip recorded at a position in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Result page (1-based)
    pub page: u32,
    /// Row index on the page (1-based), when the skip concerns a row
    pub row: Option<usize>,
    /// What went wrong
    pub reason: SkipReason,
}

impl Diagnostic {
    /// Diagnostic for a specific row.
    #[must_use]
    pub fn row(page: u32, row: usize, reason: SkipReason) -> Self {
        Self {
            page,
            row: Some(row),
            reason,
        }
    }

    /// Diagnostic for a whole page.
    #[must_use]
    pub fn page(page: u32, reason: SkipReason) -> Self {
        Self {
            page,
            row: None,
            reason,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "page {} row {}: {}", self.page, row, self.reason),
            None => write!(f, "page {}: {}", self.page, self.reason),
        }
    }
}
