use crate::actions::{extract_domain, BrowserActions};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Settings used to launch the browser
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: Option<String>,
    pub page_load_timeout: Duration,
    pub download_dir: PathBuf,
    pub extra_args: Vec<String>,
}

impl LaunchOptions {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
            page_load_timeout: Duration::from_secs(180),
            download_dir: download_dir.into(),
            extra_args: Vec::new(),
        }
    }
}

/// Browser automation engine bound to a single page
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    page_load_timeout: Duration,
    download_dir: PathBuf,
}

impl BrowserEngine {
    /// Launch Chromium, open a blank page and route downloads to `download_dir`
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        let fingerprint = FingerprintConfig::resolve(
            options.user_agent.as_deref(),
            options.window_width,
            options.window_height,
        );

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(options.page_load_timeout)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--dns-prefetch-disable");
        if !options.headless {
            builder = builder.with_head();
        }
        for arg in &options.extra_args {
            builder = builder.arg(arg.clone());
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        page.set_user_agent(fingerprint.user_agent.clone())
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let download_dir = prepare_download_dir(&options.download_dir).await?;
        let mut params = SetDownloadBehaviorParams::new(SetDownloadBehaviorBehavior::Allow);
        params.download_path = Some(download_dir.to_string_lossy().into_owned());
        browser
            .execute(params)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(
            "Browser launched (headless: {}, downloads: {})",
            options.headless,
            download_dir.display()
        );

        Ok(Self {
            browser,
            page,
            handler,
            fingerprint,
            page_load_timeout: options.page_load_timeout,
            download_dir,
        })
    }

    /// Absolute directory the browser saves downloads into
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// User agent presented to the site
    pub fn user_agent(&self) -> &str {
        &self.fingerprint.user_agent
    }

    /// Close the browser and stop the event handler
    pub async fn close(mut self) -> Result<()> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        self.handler.abort();
        result
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::ScriptError)?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        tracing::debug!("Navigating to {} ({})", url, domain);

        let load = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
            Ok(())
        };

        tokio::time::timeout(self.page_load_timeout, load)
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "page load exceeded {:?} for {}",
                    self.page_load_timeout, url
                ))
            })?
    }

    async fn count(&self, xpath: &str) -> Result<usize> {
        self.evaluate(count_script(xpath)).await
    }

    async fn texts(&self, xpath: &str) -> Result<Vec<String>> {
        self.evaluate(texts_script(xpath)).await
    }

    async fn attribute(&self, xpath: &str, name: &str) -> Result<Option<String>> {
        let lookup: AttributeLookup = self.evaluate(attribute_script(xpath, name)).await?;
        if !lookup.found {
            return Err(BrowserError::SelectorNotFound(xpath.to_string()));
        }
        Ok(lookup.value)
    }

    async fn click(&self, xpath: &str) -> Result<()> {
        let clicked: bool = self.evaluate(click_script(xpath)).await?;
        if clicked {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(xpath.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct AttributeLookup {
    found: bool,
    value: Option<String>,
}

async fn prepare_download_dir(dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    Ok(tokio::fs::canonicalize(dir).await?)
}

/// JS snippet binding `nodes` to an ordered snapshot of the XPath matches
fn snapshot_prelude(xpath: &str) -> String {
    let literal = serde_json::Value::String(xpath.to_string()).to_string();
    format!(
        "const snap = document.evaluate({literal}, document, null, \
         XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
         const nodes = []; \
         for (let i = 0; i < snap.snapshotLength; i++) {{ nodes.push(snap.snapshotItem(i)); }}"
    )
}

fn count_script(xpath: &str) -> String {
    format!("(() => {{ {} return nodes.length; }})()", snapshot_prelude(xpath))
}

fn texts_script(xpath: &str) -> String {
    format!(
        "(() => {{ {} return nodes.map(n => (n.innerText || n.textContent || '').trim()); }})()",
        snapshot_prelude(xpath)
    )
}

fn attribute_script(xpath: &str, name: &str) -> String {
    let name = serde_json::Value::String(name.to_string()).to_string();
    format!(
        "(() => {{ {} if (nodes.length === 0) {{ return {{ found: false, value: null }}; }} \
         return {{ found: true, value: nodes[0].getAttribute({name}) }}; }})()",
        snapshot_prelude(xpath)
    )
}

fn click_script(xpath: &str) -> String {
    format!(
        "(() => {{ {} if (nodes.length === 0) {{ return false; }} nodes[0].click(); return true; }})()",
        snapshot_prelude(xpath)
    )
}
