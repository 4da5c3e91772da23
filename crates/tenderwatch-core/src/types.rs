//! Data model shared by the scraper, report builder and notifier.
//!
//! A run accumulates [`TenderRecord`]s in scrape order, derives at most one
//! [`KeywordMatch`] per tender number and hands the finished [`RunResult`] to
//! the output stages.

use crate::diagnostics::Diagnostic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Characters that cannot appear in a file name on at least one supported platform.
const INVALID_FILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
/// Suffixes that mark a download as still in progress
const PARTIAL_SUFFIXES: [&str; 3] = [".crdownload", ".part", ".tmp"];

/// One row of the tender listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRecord {
    /// Display-only serial number
    pub serial: String,
    /// Business key, used to name downloaded documents and join stages
    pub tender_number: String,
    /// Free-text tender description
    pub details: String,
    /// Advertisement date as displayed (not parsed)
    pub advertised_date: String,
    /// Closing date as displayed (not parsed)
    pub closing_date: String,
    /// Result page the row was read from (1-based, 0 when unknown)
    #[serde(default)]
    pub page: u32,
    /// Correlated document in the download directory
    #[serde(default)]
    pub document: Option<PathBuf>,
}

impl TenderRecord {
    /// Create a record without page or document information.
    pub fn new(
        serial: impl Into<String>,
        tender_number: impl Into<String>,
        details: impl Into<String>,
        advertised_date: impl Into<String>,
        closing_date: impl Into<String>,
    ) -> Self {
        Self {
            serial: serial.into(),
            tender_number: tender_number.into(),
            details: details.into(),
            advertised_date: advertised_date.into(),
            closing_date: closing_date.into(),
            page: 0,
            document: None,
        }
    }

    /// Set the result page this record was read from.
    #[must_use]
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// File stem used for the record's correlated document.
    ///
    /// Characters that are invalid in file names, control characters and `%`
    /// itself are percent-encoded, so distinct tender numbers never share a
    /// stem. A leading dot, or a trailing suffix browsers use for partial
    /// downloads, is encoded too so the document stays visible. Returns `None`
    /// when the tender number is empty.
    #[must_use]
    pub fn file_stem(&self) -> Option<String> {
        let trimmed = self.tender_number.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut stem = String::with_capacity(trimmed.len());
        for (i, c) in trimmed.chars().enumerate() {
            if c == '%' || INVALID_FILE_CHARS.contains(&c) || c.is_control() || (i == 0 && c == '.')
            {
                percent_encode(c, &mut stem);
            } else {
                stem.push(c);
            }
        }

        if let Some(suffix) = PARTIAL_SUFFIXES.iter().find(|s| stem.ends_with(*s)) {
            let dot = stem.len() - suffix.len();
            stem.replace_range(dot..=dot, "%2E");
        }

        Some(stem)
    }
}

fn percent_encode(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{byte:02X}"));
    }
}

/// Escape text for inclusion in an HTML body.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keywords found in one tender's details, with the highlighted rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// Tender number the match belongs to
    pub tender_number: String,
    /// Matched keywords in configured order
    pub keywords: Vec<String>,
    /// Details with every match span wrapped in `<b>…</b>`
    pub highlighted: String,
}

/// Tender number → [`KeywordMatch`] mapping that iterates in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatches {
    entries: Vec<KeywordMatch>,
    index: HashMap<String, usize>,
}

impl KeywordMatches {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a match unless its tender number is already present.
    ///
    /// Returns `false` when an earlier match for the same tender number exists.
    pub fn insert(&mut self, entry: KeywordMatch) -> bool {
        if self.index.contains_key(&entry.tender_number) {
            return false;
        }
        self.index
            .insert(entry.tender_number.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Look up the match for a tender number.
    #[must_use]
    pub fn get(&self, tender_number: &str) -> Option<&KeywordMatch> {
        self.index.get(tender_number).map(|&i| &self.entries[i])
    }

    /// Whether the tender number has a match.
    #[must_use]
    pub fn contains(&self, tender_number: &str) -> bool {
        self.index.contains_key(tender_number)
    }

    /// Number of matched tenders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tender matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matches in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &KeywordMatch> {
        self.entries.iter()
    }
}

/// Everything a run produced, handed read-only to the output stages.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Records in scrape order (page-major, then row-major)
    pub records: Vec<TenderRecord>,
    /// Keyword matches keyed by tender number
    pub matches: KeywordMatches,
    /// Correlated documents of matched records
    pub evidence: Vec<PathBuf>,
    /// Recoverable problems seen during extraction
    pub diagnostics: Vec<Diagnostic>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When extraction finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunResult {
    /// Create an empty result stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            matches: KeywordMatches::new(),
            evidence: Vec::new(),
            diagnostics: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Whether the tender number matched at least one keyword.
    #[must_use]
    pub fn is_matched(&self, tender_number: &str) -> bool {
        self.matches.contains(tender_number)
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword_match(tender: &str) -> KeywordMatch {
        KeywordMatch {
            tender_number: tender.to_string(),
            keywords: vec!["Bank".to_string()],
            highlighted: "<b>Bank</b>".to_string(),
        }
    }

    fn stem(tender_number: &str) -> Option<String> {
        TenderRecord::new("1", tender_number, "", "", "").file_stem()
    }

    #[test]
    fn test_file_stem_encodes_separators() {
        assert_eq!(stem(" TS/12:2024 ").as_deref(), Some("TS%2F12%3A2024"));
        assert_eq!(stem("T-1").as_deref(), Some("T-1"));
    }

    #[test]
    fn test_file_stem_is_collision_free() {
        let stems: Vec<_> = ["A/1", "A:1", "A_1", "A%2F1"]
            .iter()
            .map(|n| stem(n).unwrap())
            .collect();
        assert_eq!(stems, vec!["A%2F1", "A%3A1", "A_1", "A%252F1"]);
    }

    #[test]
    fn test_file_stem_keeps_documents_visible() {
        assert_eq!(stem(".hidden").as_deref(), Some("%2Ehidden"));
        assert_eq!(stem("..").as_deref(), Some("%2E."));
        assert_eq!(stem("T-1.part").as_deref(), Some("T-1%2Epart"));
        assert_eq!(stem("T-1.crdownload").as_deref(), Some("T-1%2Ecrdownload"));
        assert_eq!(stem("T.1").as_deref(), Some("T.1"));
    }

    #[test]
    fn test_file_stem_rejects_empty() {
        assert!(stem("   ").is_none());
        assert!(stem("").is_none());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"R&D <"x">"#), "R&amp;D &lt;&quot;x&quot;&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_keyword_matches_first_seen_wins() {
        let mut matches = KeywordMatches::new();
        assert!(matches.insert(keyword_match("T-1")));
        assert!(matches.insert(keyword_match("T-2")));

        let mut duplicate = keyword_match("T-1");
        duplicate.keywords = vec!["University".to_string()];
        assert!(!matches.insert(duplicate));

        assert_eq!(matches.len(), 2);
        assert_eq!(matches.get("T-1").unwrap().keywords, vec!["Bank"]);
        let order: Vec<_> = matches.iter().map(|m| m.tender_number.as_str()).collect();
        assert_eq!(order, vec!["T-1", "T-2"]);
    }

    #[test]
    fn test_run_result_starts_empty() {
        let result = RunResult::new();
        assert!(result.records.is_empty());
        assert!(result.matches.is_empty());
        assert!(result.evidence.is_empty());
        assert!(result.finished_at.is_none());
        assert!(!result.is_matched("T-1"));
    }

    #[test]
    fn test_record_serialization_defaults() {
        let json = r#"{"serial":"1","tender_number":"T-1","details":"d","advertised_date":"a","closing_date":"c"}"#;
        let record: TenderRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(record.page, 0);
        assert!(record.document.is_none());
    }
}
