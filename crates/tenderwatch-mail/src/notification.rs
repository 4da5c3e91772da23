use std::path::{Path, PathBuf};
use tenderwatch_core::{escape_html, KeywordMatch, RunResult};

/// Body sent when no tender matched
pub const NO_MATCH_BODY: &str = "<p><b>No keywords detected.</b></p>";

/// Composed end-of-run message; transport-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
    /// Report first, then evidence documents
    pub attachments: Vec<PathBuf>,
}

impl Notification {
    /// Compose the message for a finished run.
    pub fn compose(result: &RunResult, report_path: &Path, subject_prefix: &str) -> Self {
        let html_body = if result.matches.is_empty() {
            NO_MATCH_BODY.to_string()
        } else {
            result.matches.iter().map(match_fragment).collect()
        };

        let subject = match result.matches.len() {
            0 => format!("{subject_prefix} - No matches"),
            n => format!("{subject_prefix} - {n} matches found"),
        };

        let attachments = std::iter::once(report_path.to_path_buf())
            .chain(result.evidence.iter().cloned())
            .collect();

        Self {
            subject,
            html_body,
            attachments,
        }
    }
}

/// HTML paragraph announcing one matched tender.
///
/// `highlighted` is already escaped by the matcher.
pub fn match_fragment(entry: &KeywordMatch) -> String {
    format!(
        "<p><b>Tender {}</b> contains keywords <b>{}</b><br>------<br>{}<br>------</p>",
        escape_html(&entry.tender_number),
        escape_html(&entry.keywords.join(", ")),
        entry.highlighted
    )
}
