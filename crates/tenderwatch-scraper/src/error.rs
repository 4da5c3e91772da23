use thiserror::Error;

/// Errors that abort a scrape run.
///
/// Row, download and pagination problems never surface here; they are
/// recorded as diagnostics on the run result instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("navigation to {url} failed after {attempts} attempts: {last_error}")]
    NavigationExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("category '{category}' not found after searching {pages_searched} list pages")]
    CategoryUnreachable {
        category: String,
        pages_searched: u32,
    },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
