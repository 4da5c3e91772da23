//! Browser automation engine for JavaScript-rendered listing pages.
//!
//! Provides headless Chromium control behind the [`BrowserActions`] trait,
//! with XPath lookups re-resolved on every call, programmatic clicks and a
//! configured download directory.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::BrowserActions;
pub use engine::{BrowserEngine, LaunchOptions};
pub use error::{BrowserError, Result};
