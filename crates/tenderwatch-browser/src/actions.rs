use crate::error::{BrowserError, Result};

/// Browser actions the scraper drives the listing page with.
///
/// Every lookup takes an XPath expression and is resolved against the live
/// DOM at call time; implementations must not cache element handles.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL and wait for the load to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Count nodes matching an XPath expression
    async fn count(&self, xpath: &str) -> Result<usize>;

    /// Visible text of every matching node, in document order
    async fn texts(&self, xpath: &str) -> Result<Vec<String>>;

    /// Attribute of the first matching node (`None` if absent)
    async fn attribute(&self, xpath: &str, name: &str) -> Result<Option<String>>;

    /// Dispatch a programmatic click on the first matching node
    async fn click(&self, xpath: &str) -> Result<()>;

    /// Extract text from the first matching node
    async fn extract_text(&self, xpath: &str) -> Result<String> {
        self.texts(xpath)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::SelectorNotFound(xpath.to_string()))
    }
}

/// Validate a navigation target and return its host.
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
