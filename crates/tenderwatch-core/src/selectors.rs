//! XPath locators for the tender listing page.
//!
//! Row-level locators are composed from the row collection query with a
//! positional index, so every lookup re-resolves against the live DOM
//! instead of reusing element handles.

use serde::{Deserialize, Serialize};

/// Locators for the listing page. Defaults target the PPRA sector-wise view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Transient loading overlay
    pub loading_overlay: String,
    /// Result table rows
    pub rows: String,
    /// "Next" affordance of the paginated category list
    pub category_next: String,
    /// "Next" affordance of the results table
    pub results_next: String,
    /// Element holding the total page count
    pub total_pages: String,
    /// Download icon, relative to the document cell
    pub download_icon: String,
    /// Cell tag inside a row
    pub cell_tag: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            loading_overlay: "//div[contains(@class,'ngx-spinner-overlay')]".to_string(),
            rows: "//tr[contains(@class, 'ng-star-inserted')]".to_string(),
            category_next: "//li[@class='page-item']/a[contains(text(),'Next')]".to_string(),
            results_next: "//a[contains(text(),'Next')]".to_string(),
            total_pages: "//small[contains(text(),'Total Pages')]/strong".to_string(),
            download_icon: ".//i[contains(@class,'fa-file-download')]".to_string(),
            cell_tag: "td".to_string(),
        }
    }
}

impl Selectors {
    /// Link whose text contains the category name.
    #[must_use]
    pub fn category_link(&self, category: &str) -> String {
        format!("//a[contains(text(),{})]", xpath_literal(category))
    }

    /// The `row`-th result row (1-based).
    #[must_use]
    pub fn row(&self, row: usize) -> String {
        format!("({})[{row}]", self.rows)
    }

    /// All cells of the `row`-th result row.
    #[must_use]
    pub fn row_cells(&self, row: usize) -> String {
        format!("{}/{}", self.row(row), self.cell_tag)
    }

    /// The `column`-th cell (0-based) of the `row`-th result row.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> String {
        format!("{}[{}]", self.row_cells(row), column + 1)
    }

    /// All download icons in a row's document cell.
    #[must_use]
    pub fn download_icons(&self, row: usize, column: usize) -> String {
        let relative = self.download_icon.trim_start_matches('.');
        format!("{}{relative}", self.cell(row, column))
    }

    /// The `index`-th download icon (1-based) in a row's document cell.
    #[must_use]
    pub fn download_icon(&self, row: usize, column: usize, index: usize) -> String {
        format!("({})[{index}]", self.download_icons(row, column))
    }

    /// Anchor wrapping the `index`-th download icon.
    #[must_use]
    pub fn download_link(&self, row: usize, column: usize, index: usize) -> String {
        format!("{}/parent::a", self.download_icon(row, column, index))
    }
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so a value containing both quote kinds is
/// assembled with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
