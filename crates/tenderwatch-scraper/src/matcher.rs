//! Keyword detection over extracted tender details.

use regex::RegexBuilder;
use std::collections::HashSet;
use std::path::PathBuf;
use tenderwatch_core::{escape_html, KeywordMatch, KeywordMatches, RunResult, TenderRecord};

/// Case-insensitive keyword matcher.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher; blank terms are dropped, order is kept.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        Self {
            keywords: terms
                .iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Keywords found in `details`, in configured order.
    pub fn find(&self, details: &str) -> Vec<&str> {
        let haystack = details.to_lowercase();
        self.keywords
            .iter()
            .filter(|kw| haystack.contains(&kw.to_lowercase()))
            .map(String::as_str)
            .collect()
    }

    /// Match one record, or `None` if no keyword occurs in its details.
    pub fn match_record(&self, record: &TenderRecord) -> Option<KeywordMatch> {
        let found = self.find(&record.details);
        if found.is_empty() {
            return None;
        }

        Some(KeywordMatch {
            tender_number: record.tender_number.clone(),
            highlighted: highlight(&record.details, &found),
            keywords: found.into_iter().map(ToString::to_string).collect(),
        })
    }

    /// Match every record; a tender number already matched is skipped.
    pub fn match_records(&self, records: &[TenderRecord]) -> KeywordMatches {
        let mut matches = KeywordMatches::new();

        for record in records {
            if matches.contains(&record.tender_number) {
                continue;
            }
            if let Some(found) = self.match_record(record) {
                tracing::info!(
                    "Tender {} contains keywords {}",
                    found.tender_number,
                    found.keywords.join(", ")
                );
                matches.insert(found);
            }
        }

        matches
    }

    /// Fill the run's matches and evidence. The result is final afterwards.
    pub fn apply(&self, mut result: RunResult) -> RunResult {
        result.matches = self.match_records(&result.records);
        result.evidence = evidence_files(&result.records, &result.matches);
        result
    }
}

/// Correlated documents of matched records that exist on disk.
pub fn evidence_files(records: &[TenderRecord], matches: &KeywordMatches) -> Vec<PathBuf> {
    let mut seen = HashSet::new();

    records
        .iter()
        .filter(|r| matches.contains(&r.tender_number))
        .filter_map(|r| r.document.clone())
        .filter(|path| path.is_file())
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Wrap every occurrence of `keywords` in `<b>…</b>`, escaping the rest.
///
/// One pass over an alternation (longest keyword first) so overlapping
/// keywords never produce nested markup. Original casing is kept.
pub fn highlight(details: &str, keywords: &[&str]) -> String {
    let mut alternatives: Vec<&str> = keywords.iter().copied().filter(|k| !k.is_empty()).collect();
    if alternatives.is_empty() {
        return escape_html(details);
    }
    alternatives.sort_by_key(|k| std::cmp::Reverse(k.len()));

    let pattern = alternatives
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Keyword pattern rejected, details left unhighlighted: {}", e);
            return escape_html(details);
        }
    };

    let mut out = String::with_capacity(details.len() + 16);
    let mut last = 0;
    for m in re.find_iter(details) {
        out.push_str(&escape_html(&details[last..m.start()]));
        out.push_str("<b>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</b>");
        last = m.end();
    }
    out.push_str(&escape_html(&details[last..]));
    out
}
