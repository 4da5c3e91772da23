//! Category lookup and result-page traversal.

use crate::error::{Result, ScrapeError};
use crate::session::ScrapeSession;
use tenderwatch_browser::BrowserActions;
use tenderwatch_core::{Diagnostic, SkipReason};

/// Where the controller is in finding the configured category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryState {
    /// Searching the category list, currently on the given list page
    Locating { list_page: u32 },
    /// Category link clicked
    Located,
}

/// Parse the "Total Pages" indicator; anything unusable means one page.
pub fn parse_total_pages(text: Option<&str>) -> u32 {
    text.and_then(|t| t.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

impl<D: BrowserActions + ?Sized> ScrapeSession<'_, D> {
    /// Open the configured category, paging through the category list if needed.
    pub(crate) async fn locate_category(&mut self) -> Result<()> {
        let category = self.portal.category.clone();
        let link = self.portal.selectors.category_link(&category);
        let next = self.portal.selectors.category_next.clone();
        let mut state = CategoryState::Locating { list_page: 1 };

        while let CategoryState::Locating { list_page } = state {
            if list_page > self.config.max_category_pages {
                break;
            }

            self.await_stable().await;
            if self.wait_for(&link).await {
                match self.driver.click(&link).await {
                    Ok(()) => {
                        tracing::info!("Opened category '{}' (list page {})", category, list_page);
                        state = CategoryState::Located;
                        continue;
                    }
                    Err(e) => tracing::warn!("Category link not clickable: {}", e),
                }
            }

            self.await_stable().await;
            if !self.wait_for(&next).await {
                return Err(ScrapeError::CategoryUnreachable {
                    category,
                    pages_searched: list_page,
                });
            }
            if let Err(e) = self.driver.click(&next).await {
                tracing::warn!("Category list next page not clickable: {}", e);
                return Err(ScrapeError::CategoryUnreachable {
                    category,
                    pages_searched: list_page,
                });
            }
            tracing::debug!("Category not on list page {}, moving on", list_page);
            self.await_stable().await;

            state = CategoryState::Locating {
                list_page: list_page + 1,
            };
        }

        match state {
            CategoryState::Located => Ok(()),
            CategoryState::Locating { .. } => {
                tracing::error!(
                    "Category '{}' not found within {} list pages",
                    category,
                    self.config.max_category_pages
                );
                Err(ScrapeError::CategoryUnreachable {
                    category,
                    pages_searched: self.config.max_category_pages,
                })
            }
        }
    }

    /// Extract result pages 1..=N, stopping early if "Next" disappears.
    pub(crate) async fn walk_pages(&mut self) {
        self.await_stable().await;
        if !self.wait_for(&self.portal.selectors.rows).await {
            tracing::warn!("No result rows appeared for '{}'", self.portal.category);
        }

        let total_pages = self.read_total_pages().await;
        tracing::info!("Total pages: {}", total_pages);

        let next = self.portal.selectors.results_next.clone();
        for page in 1..=total_pages {
            let extracted = self.extract_page(page).await.len();
            tracing::info!("Page {}/{}: {} records", page, total_pages, extracted);

            if page == total_pages {
                break;
            }

            self.await_stable().await;
            let advanced = self.wait_for(&next).await && self.driver.click(&next).await.is_ok();
            if !advanced {
                self.record_diagnostic(Diagnostic::page(
                    page,
                    SkipReason::PaginationEndedEarly { total_pages },
                ));
                break;
            }
            tokio::time::sleep(self.config.page_settle()).await;
        }
    }

    async fn read_total_pages(&self) -> u32 {
        let xpath = &self.portal.selectors.total_pages;
        if !self.wait_for(xpath).await {
            return 1;
        }

        match self.driver.extract_text(xpath).await {
            Ok(text) => parse_total_pages(Some(&text)),
            Err(e) => {
                tracing::debug!("Total pages unreadable: {}", e);
                1
            }
        }
    }
}
