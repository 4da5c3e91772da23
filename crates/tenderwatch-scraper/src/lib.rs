//! Tender extraction from the paginated sector-wise listing.
//!
//! A [`ScrapeSession`] drives a [`tenderwatch_browser::BrowserActions`]
//! implementation through navigation, category lookup and result pages,
//! correlating each row's downloads to its tender number. The
//! [`KeywordMatcher`] then turns the extracted records into matches and
//! evidence files.

pub mod download;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod matcher;
pub mod navigator;
pub mod pagination;
pub mod session;

pub use download::DownloadDir;
pub use error::{Result, ScrapeError};
pub use gate::{await_stable, wait_for_element};
pub use matcher::{evidence_files, highlight, KeywordMatcher};
pub use navigator::navigate_with_retry;
pub use session::ScrapeSession;
