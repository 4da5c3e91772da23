//! One-sheet spreadsheet report of every extracted tender.
//!
//! Details of matched tenders are bold; every cell wraps and aligns to the
//! top, with column widths and row heights estimated from the text.

pub mod error;
pub mod layout;
pub mod workbook;

pub use error::{ReportError, Result};
pub use workbook::{ReportBuilder, HEADERS};
