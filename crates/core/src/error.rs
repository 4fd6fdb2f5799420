//! Error types for crimetrend operations.
//!
//! This module defines the main error type [`CrimetrendError`] which represents
//! every failure the pipeline can report: fetching the page, shaping the
//! scraped table, and fitting per-category models. Unparseable numeric cells
//! are not errors; they become missing values during cleaning.
//!
//! # Example
//!
//! ```rust
//! use crimetrend_core::{CrimetrendError, Result};
//!
//! fn require_table(html: &str) -> Result<()> {
//!     if !html.contains("<table") {
//!         return Err(CrimetrendError::NoTable);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the scrape, reshape and fit pipeline.
///
/// The variants fall into three groups: fetch failures, table-shape
/// failures, and model-fit failures. Fit failures always carry the name of
/// the category that triggered them.
///
/// # Example
///
/// ```rust
/// use crimetrend_core::CrimetrendError;
///
/// let err = CrimetrendError::HeaderMismatch { expected: 12, found: 11 };
/// match err {
///     CrimetrendError::HeaderMismatch { expected, found } => {
///         println!("table has {} columns, header list has {}", expected, found);
///     }
///     e => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum CrimetrendError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP request returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML could not be queried, usually because of an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParse(String),

    /// The page contains no table (or the selected table has no rows).
    #[error("No table found in the document")]
    NoTable,

    /// A table row has a different number of cells than the first row.
    ///
    /// Widths are compared after `colspan`/`rowspan` expansion.
    #[error("Table is not rectangular: row {row} has {found} cells, expected {expected}")]
    RaggedTable { row: usize, expected: usize, found: usize },

    /// The header list length does not match the table's column count.
    #[error("Header list has {found} names but the table has {expected} columns")]
    HeaderMismatch { expected: usize, found: usize },

    /// The same category name appears twice in the header list.
    #[error("Duplicate category name in header list: {0}")]
    DuplicateCategory(String),

    /// No header name equals the configured year label.
    #[error("Header list has no year column labelled {0:?}")]
    MissingYearColumn(String),

    /// Two data rows carry the same year.
    #[error("Year {0} appears more than once in the table")]
    DuplicateYear(i32),

    /// Too few usable observations to estimate the model.
    #[error("Cannot fit {category}: {observations} observations for {parameters} parameters")]
    InsufficientData { category: String, observations: usize, parameters: usize },

    /// A variable that must vary is constant.
    #[error("Cannot fit {category}: {variable} has zero variance")]
    ZeroVariance { category: String, variable: String },

    /// The design matrix could not be inverted.
    #[error("Cannot fit {category}: design matrix is singular")]
    SingularDesign { category: String },

    /// A category name was requested that the table does not contain.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// File not found.
    ///
    /// Returned when attempting to read a file that doesn't exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Standard I/O errors from reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization of a report failed.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CrimetrendError {
    /// Returns the category a fit error refers to, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            CrimetrendError::InsufficientData { category, .. }
            | CrimetrendError::ZeroVariance { category, .. }
            | CrimetrendError::SingularDesign { category } => Some(category),
            CrimetrendError::UnknownCategory(category) => Some(category),
            _ => None,
        }
    }
}

/// Result type alias for CrimetrendError.
///
/// This is a convenience alias for `std::result::Result<T, CrimetrendError>`.
pub type Result<T> = std::result::Result<T, CrimetrendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrimetrendError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_header_mismatch_error() {
        let err = CrimetrendError::HeaderMismatch { expected: 12, found: 11 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn test_fit_errors_name_category() {
        let err = CrimetrendError::ZeroVariance { category: "Theft".to_string(), variable: "Year".to_string() };
        assert!(err.to_string().contains("Theft"));
        assert_eq!(err.category(), Some("Theft"));

        let err = CrimetrendError::InsufficientData { category: "Fraud".to_string(), observations: 1, parameters: 2 };
        assert_eq!(err.category(), Some("Fraud"));
        assert_eq!(CrimetrendError::NoTable.category(), None);
    }

    #[test]
    fn test_ragged_table_error() {
        let err = CrimetrendError::RaggedTable { row: 3, expected: 5, found: 4 };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("expected 5"));
    }
}
