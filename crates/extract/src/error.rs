//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! There is no "section not found" kind: a missing card becomes an absent
//! optional field on the extracted record, and a malformed row is dropped.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document was empty (or only whitespace), there is nothing to extract.
    #[display("empty HTML document")]
    EmptyDocument,
    /// The configured URL template could not be compiled or rendered.
    #[display("invalid URL template: {_0}")]
    Template(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Extraction is pure: the same document will always fail the same way.
        false
    }
}
