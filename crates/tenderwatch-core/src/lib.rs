//! Tenderwatch Core - Foundation crate for the tender scraper.
//!
//! This crate provides the shared data model, run diagnostics, page selectors
//! and configuration management that all other tenderwatch crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Tender records, keyword matches and the run result
//! - [`diagnostics`] - Recoverable-skip reasons collected during a run
//! - [`selectors`] - XPath locators for the tender listing page
//!
//! # Example
//!
//! ```rust
//! use tenderwatch_core::{AppConfig, TenderRecord};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.portal.category, "Info and Comm Tech");
//!
//! let record = TenderRecord::new("1", "TS-12/2024", "Network upgrade", "01/01", "15/01");
//! assert_eq!(record.file_stem().as_deref(), Some("TS-12%2F2024"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod selectors;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, KeywordConfig, MultiFilePolicy, NotificationConfig, OutputConfig,
    PortalConfig, ScrapingConfig,
};
pub use diagnostics::{Diagnostic, SkipReason};
pub use error::{ConfigError, ConfigResult};
pub use selectors::{xpath_literal, Selectors};
pub use types::{escape_html, KeywordMatch, KeywordMatches, RunResult, TenderRecord};
