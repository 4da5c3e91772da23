//! Configuration management for tenderwatch.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::selectors::Selectors;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/tenderwatch/config.toml` (or platform
/// equivalent) unless a path is given explicitly. If the default file doesn't
/// exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target site and locators
    pub portal: PortalConfig,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Retry, wait and download behavior
    pub scraping: ScrapingConfig,
    /// Keywords flagged in tender details
    pub keywords: KeywordConfig,
    /// Where documents and the report are written
    pub output: OutputConfig,
    /// Notification delivery
    pub notification: NotificationConfig,
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// # Errors
    /// Returns error if:
    /// - An explicit path does not exist
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration and apply overrides from the process environment.
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to resolve variables.
    ///
    /// Supports the following variables:
    /// - `TENDERWATCH_URL`, `TENDERWATCH_CATEGORY`
    /// - `TENDERWATCH_KEYWORDS` (comma separated)
    /// - `TENDERWATCH_HEADLESS` (true/false)
    /// - `TENDERWATCH_DOWNLOAD_DIR`
    /// - `TENDERWATCH_SENDER`, `TENDERWATCH_RECIPIENT`
    /// - `TENDERWATCH_SMTP_HOST`, `TENDERWATCH_SMTP_USERNAME`, `TENDERWATCH_SMTP_PASSWORD`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TENDERWATCH_URL") {
            tracing::debug!("Override portal.url from env: {}", url);
            self.portal.url = url;
        }

        if let Some(category) = lookup("TENDERWATCH_CATEGORY") {
            tracing::debug!("Override portal.category from env: {}", category);
            self.portal.category = category;
        }

        if let Some(keywords) = lookup("TENDERWATCH_KEYWORDS") {
            self.keywords.terms = keywords
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string)
                .collect();
            tracing::debug!("Override keywords from env: {:?}", self.keywords.terms);
        }

        if let Some(val) = lookup("TENDERWATCH_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(dir) = lookup("TENDERWATCH_DOWNLOAD_DIR") {
            self.output.download_dir = PathBuf::from(dir);
        }

        if let Some(sender) = lookup("TENDERWATCH_SENDER") {
            self.notification.sender = Some(sender);
        }

        if let Some(recipient) = lookup("TENDERWATCH_RECIPIENT") {
            self.notification.recipient = Some(recipient);
        }

        if let Some(host) = lookup("TENDERWATCH_SMTP_HOST") {
            self.notification.smtp_host = host;
        }

        if let Some(username) = lookup("TENDERWATCH_SMTP_USERNAME") {
            self.notification.smtp_username = Some(username);
        }

        if let Some(password) = lookup("TENDERWATCH_SMTP_PASSWORD") {
            self.notification.smtp_password = Some(password);
        }
    }

    /// Check values the pipeline cannot run without.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.portal.category.trim().is_empty() {
            return Err(invalid("portal.category", "must not be empty"));
        }

        url::Url::parse(&self.portal.url)
            .map_err(|e| invalid("portal.url", &format!("not a valid URL: {e}")))?;

        if self.scraping.navigation_retries == 0 {
            return Err(invalid("scraping.navigation_retries", "must be at least 1"));
        }

        if self.scraping.row_attempts == 0 {
            return Err(invalid("scraping.row_attempts", "must be at least 1"));
        }

        if self.scraping.download_poll_ms == 0 || self.scraping.poll_interval_ms == 0 {
            return Err(invalid("scraping", "poll intervals must be non-zero"));
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/tenderwatch/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "tenderwatch", "tenderwatch")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Target site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Listing page URL
    pub url: String,
    /// Category (sector) link text to open
    pub category: String,
    /// Page locators
    pub selectors: Selectors,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: "https://ppra.gov.pk/#/tenders/sectorwisetenders".to_string(),
            category: "Info and Comm Tech".to_string(),
            selectors: Selectors::default(),
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Per-attempt page load timeout in seconds
    pub page_load_timeout_secs: u64,
    /// Fixed user agent; a common desktop agent is picked when unset
    pub user_agent: Option<String>,
    /// Extra Chromium command-line switches
    pub extra_args: Vec<String>,
}

impl BrowserConfig {
    /// Page load timeout as a duration.
    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            page_load_timeout_secs: 180,
            user_agent: None,
            extra_args: Vec::new(),
        }
    }
}

/// What to do when one poll sees several new files after a single download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiFilePolicy {
    /// Adopt one file (the last name in sort order) and leave the rest
    #[default]
    TakeAny,
    /// Treat the download as failed
    Reject,
}

/// Retry, wait and download behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Page load attempts before the run is aborted
    pub navigation_retries: u32,
    /// Fixed delay between page load attempts in seconds
    pub navigation_delay_secs: u64,
    /// How long to wait for an expected element in seconds
    pub element_timeout_secs: u64,
    /// How long the loading gate waits for the overlay to clear in seconds
    pub gate_timeout_secs: u64,
    /// Interval between DOM polls in milliseconds
    pub poll_interval_ms: u64,
    /// Read attempts per row
    pub row_attempts: u32,
    /// Pause between row read attempts in milliseconds
    pub row_retry_delay_ms: u64,
    /// Maximum wait for a triggered download in seconds
    pub download_timeout_secs: u64,
    /// Interval between download directory polls in milliseconds
    pub download_poll_ms: u64,
    /// Pause after moving to the next result page in milliseconds
    pub page_settle_ms: u64,
    /// Upper bound on category list pages walked while locating the category
    pub max_category_pages: u32,
    /// Handling of several new files after one download
    pub multi_file_policy: MultiFilePolicy,
}

impl ScrapingConfig {
    /// Delay between page load attempts.
    #[must_use]
    pub fn navigation_delay(&self) -> Duration {
        Duration::from_secs(self.navigation_delay_secs)
    }

    /// Expected-element wait.
    #[must_use]
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    /// Loading gate wait.
    #[must_use]
    pub fn gate_timeout(&self) -> Duration {
        Duration::from_secs(self.gate_timeout_secs)
    }

    /// DOM poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Pause between row read attempts.
    #[must_use]
    pub fn row_retry_delay(&self) -> Duration {
        Duration::from_millis(self.row_retry_delay_ms)
    }

    /// Download wait window.
    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Download directory poll interval.
    #[must_use]
    pub fn download_poll(&self) -> Duration {
        Duration::from_millis(self.download_poll_ms)
    }

    /// Pause after paging.
    #[must_use]
    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            navigation_retries: 5,
            navigation_delay_secs: 15,
            element_timeout_secs: 60,
            gate_timeout_secs: 30,
            poll_interval_ms: 250,
            row_attempts: 3,
            row_retry_delay_ms: 1000,
            download_timeout_secs: 30,
            download_poll_ms: 500,
            page_settle_ms: 1000,
            max_category_pages: 50,
            multi_file_policy: MultiFilePolicy::TakeAny,
        }
    }
}

/// Keywords flagged in tender details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Terms matched case-insensitively, reported in this order
    pub terms: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            terms: vec!["Bank".to_string(), "University".to_string()],
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Browser download directory, also holds the renamed documents
    pub download_dir: PathBuf,
    /// Spreadsheet report path
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("ppra_pdfs"),
            report_path: PathBuf::from("ppra_info_comm_tech.xlsx"),
        }
    }
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Send the notification at the end of a run
    pub enabled: bool,
    /// Sender address
    pub sender: Option<String>,
    /// Recipient address
    pub recipient: Option<String>,
    /// SMTP relay host (implicit TLS)
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP login; defaults to the sender address
    pub smtp_username: Option<String>,
    /// SMTP password (environment only, never written to disk)
    #[serde(skip)]
    pub smtp_password: Option<String>,
    /// Subject line prefix
    pub subject_prefix: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender: None,
            recipient: None,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            smtp_username: None,
            smtp_password: None,
            subject_prefix: "PPRA Tender Report".to_string(),
        }
    }
}
