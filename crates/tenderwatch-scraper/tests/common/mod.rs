//! In-memory stand-in for the listing page, recognising the same XPaths the
//! scraper generates from the default selectors.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;
use tenderwatch_browser::{BrowserActions, BrowserError, Result as BrowserResult};
use tenderwatch_core::{ScrapingConfig, Selectors};

pub const CATEGORY: &str = "Info and Comm Tech";

#[derive(Debug, Clone, Default)]
pub struct FakeDownload {
    /// `href` of the wrapping anchor; `None` means no attribute
    pub href: Option<String>,
    /// Files written into the download directory when the icon is clicked
    pub produces: Vec<String>,
    /// Overlay polls the click leaves behind while the table re-renders
    pub overlay_polls: u32,
}

impl FakeDownload {
    pub fn file(name: &str) -> Self {
        Self {
            href: Some("https://ppra.gov.pk/download/1".to_string()),
            produces: vec![name.to_string()],
            overlay_polls: 0,
        }
    }

    /// Like [`FakeDownload::file`], but the table re-renders after the click.
    pub fn rerendering(name: &str, overlay_polls: u32) -> Self {
        Self {
            overlay_polls,
            ..Self::file(name)
        }
    }

    pub fn no_op() -> Self {
        Self {
            href: Some("javascript:void(0)".to_string()),
            produces: vec!["should-not-appear.pdf".to_string()],
            overlay_polls: 0,
        }
    }

    pub fn silent() -> Self {
        Self {
            href: Some("https://ppra.gov.pk/download/2".to_string()),
            produces: Vec::new(),
            overlay_polls: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeRow {
    pub cells: Vec<String>,
    pub downloads: Vec<FakeDownload>,
    /// Reads that fail before the row becomes readable
    pub read_failures: u32,
    /// Counting the row's download links fails
    pub broken_links: bool,
}

impl FakeRow {
    pub fn tender(serial: &str, tender_number: &str, details: &str) -> Self {
        Self {
            cells: vec![
                serial.to_string(),
                format!("{tender_number} View Invoice"),
                details.to_string(),
                String::new(),
                "01/01/2025".to_string(),
                "15/01/2025".to_string(),
            ],
            ..Self::default()
        }
    }

    pub fn with_download(mut self, download: FakeDownload) -> Self {
        self.downloads.push(download);
        self
    }

    pub fn failing(mut self, reads: u32) -> Self {
        self.read_failures = reads;
        self
    }
}

#[derive(Debug, Default)]
pub struct PortalState {
    pub nav_failures: u32,
    pub navigations: u32,
    /// Category names shown on each category list page
    pub category_pages: Vec<Vec<String>>,
    pub category_page: usize,
    pub located: bool,
    pub pages: Vec<Vec<FakeRow>>,
    pub page: usize,
    pub total_pages: Option<String>,
    /// Results "Next" clicks the portal will honour
    pub next_limit: usize,
    pub spinner_polls: u32,
    pub clicks: Vec<String>,
}

pub struct FakePortal {
    pub selectors: Selectors,
    pub download_dir: PathBuf,
    pub state: Mutex<PortalState>,
}

impl FakePortal {
    /// A portal whose first category list page holds the configured category.
    pub fn new(download_dir: impl Into<PathBuf>, pages: Vec<Vec<FakeRow>>) -> Self {
        let total = pages.len();
        Self {
            selectors: Selectors::default(),
            download_dir: download_dir.into(),
            state: Mutex::new(PortalState {
                category_pages: vec![vec!["Works".to_string(), CATEGORY.to_string()]],
                total_pages: Some(total.to_string()),
                next_limit: total.saturating_sub(1),
                pages,
                ..PortalState::default()
            }),
        }
    }

    pub fn with<F: FnOnce(&mut PortalState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn icon_clicks(&self) -> usize {
        self.clicks().iter().filter(|c| c.starts_with("icon")).count()
    }

    fn current_rows(state: &PortalState) -> &[FakeRow] {
        if !state.located {
            return &[];
        }
        state.pages.get(state.page).map(Vec::as_slice).unwrap_or(&[])
    }

    fn category_visible(&self, state: &PortalState, xpath: &str) -> bool {
        !state.located
            && state
                .category_pages
                .get(state.category_page)
                .is_some_and(|names| {
                    names
                        .iter()
                        .any(|name| self.selectors.category_link(name) == xpath)
                })
    }

    fn category_next_visible(state: &PortalState) -> bool {
        !state.located && state.category_page + 1 < state.category_pages.len()
    }

    fn results_next_visible(state: &PortalState) -> bool {
        state.located && state.page < state.next_limit && state.page + 1 < state.pages.len()
    }

    /// (row, icon) addressed by a download icon or link XPath.
    fn find_icon(&self, state: &PortalState, xpath: &str, link: bool) -> Option<(usize, usize)> {
        for (r, row) in Self::current_rows(state).iter().enumerate() {
            for i in 0..row.downloads.len() {
                let candidate = if link {
                    self.selectors.download_link(r + 1, 3, i + 1)
                } else {
                    self.selectors.download_icon(r + 1, 3, i + 1)
                };
                if candidate == xpath {
                    return Some((r, i));
                }
            }
        }
        None
    }
}

#[async_trait::async_trait]
impl BrowserActions for FakePortal {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations += 1;
        if state.nav_failures > 0 {
            state.nav_failures -= 1;
            return Err(BrowserError::NavigationError(format!("timeout loading {url}")));
        }
        state.located = false;
        state.category_page = 0;
        state.page = 0;
        Ok(())
    }

    async fn count(&self, xpath: &str) -> BrowserResult<usize> {
        let mut state = self.state.lock().unwrap();
        let s = &self.selectors;

        if xpath == s.loading_overlay {
            if state.spinner_polls > 0 {
                state.spinner_polls -= 1;
                return Ok(1);
            }
            return Ok(0);
        }
        if xpath == s.rows {
            return Ok(Self::current_rows(&state).len());
        }
        if xpath == s.total_pages {
            return Ok(usize::from(state.located && state.total_pages.is_some()));
        }
        if xpath == s.category_next {
            return Ok(usize::from(Self::category_next_visible(&state)));
        }
        if xpath == s.results_next {
            return Ok(usize::from(Self::results_next_visible(&state)));
        }
        if self.category_visible(&state, xpath) {
            return Ok(1);
        }
        for (r, row) in Self::current_rows(&state).iter().enumerate() {
            if xpath == s.download_icons(r + 1, 3) {
                if row.broken_links {
                    return Err(BrowserError::ScriptError("detached node".to_string()));
                }
                return Ok(row.downloads.len());
            }
        }
        Ok(0)
    }

    async fn texts(&self, xpath: &str) -> BrowserResult<Vec<String>> {
        let mut state = self.state.lock().unwrap();

        if xpath == self.selectors.total_pages {
            return Ok(state.total_pages.iter().cloned().collect());
        }

        let located = state.located;
        let page = state.page;
        let covered = state.spinner_polls > 0;
        if let Some(rows) = state.pages.get_mut(page).filter(|_| located) {
            for (r, row) in rows.iter_mut().enumerate() {
                if xpath == self.selectors.row_cells(r + 1) {
                    if covered {
                        return Err(BrowserError::ScriptError("row is re-rendering".to_string()));
                    }
                    if row.read_failures > 0 {
                        row.read_failures -= 1;
                        return Err(BrowserError::ScriptError("stale row".to_string()));
                    }
                    return Ok(row.cells.clone());
                }
            }
        }
        Ok(Vec::new())
    }

    async fn attribute(&self, xpath: &str, name: &str) -> BrowserResult<Option<String>> {
        let state = self.state.lock().unwrap();
        match self.find_icon(&state, xpath, true) {
            Some((r, i)) if name == "href" => {
                Ok(Self::current_rows(&state)[r].downloads[i].href.clone())
            }
            Some(_) => Ok(None),
            None => Err(BrowserError::SelectorNotFound(xpath.to_string())),
        }
    }

    async fn click(&self, xpath: &str) -> BrowserResult<()> {
        let mut state = self.state.lock().unwrap();
        let s = &self.selectors;

        if self.category_visible(&state, xpath) {
            state.located = true;
            state.page = 0;
            state.clicks.push("category".to_string());
            return Ok(());
        }
        if xpath == s.category_next && Self::category_next_visible(&state) {
            state.category_page += 1;
            state.clicks.push("category-next".to_string());
            return Ok(());
        }
        if xpath == s.results_next && Self::results_next_visible(&state) {
            state.page += 1;
            state.clicks.push("next".to_string());
            return Ok(());
        }
        if let Some((r, i)) = self.find_icon(&state, xpath, false) {
            let download = Self::current_rows(&state)[r].downloads[i].clone();
            for name in &download.produces {
                std::fs::write(self.download_dir.join(name), name.as_bytes())
                    .map_err(BrowserError::DownloadDir)?;
            }
            state.spinner_polls += download.overlay_polls;
            state.clicks.push(format!("icon {}/{}", r + 1, i + 1));
            return Ok(());
        }

        Err(BrowserError::SelectorNotFound(xpath.to_string()))
    }
}

/// Scraping settings with every wait collapsed to a single check.
pub fn fast_config() -> ScrapingConfig {
    ScrapingConfig {
        navigation_retries: 3,
        navigation_delay_secs: 0,
        element_timeout_secs: 0,
        gate_timeout_secs: 0,
        poll_interval_ms: 1,
        row_attempts: 3,
        row_retry_delay_ms: 0,
        download_timeout_secs: 0,
        download_poll_ms: 1,
        page_settle_ms: 0,
        max_category_pages: 5,
        ..ScrapingConfig::default()
    }
}
