//! Fetch Error Types
//!
//! Kinds are [`Clone`] because a single fetch is shared by every caller
//! waiting on the same key; each of them receives its own copy of the
//! outcome.

use crate::retry::TRANSIENT_STATUSES;
use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered, but not with a success status
    #[display("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },
    /// No response at all (DNS, connection, TLS, timeout)
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The response body could not be read or deserialised
    #[display("could not decode response: {_0}")]
    Decode(#[error(not(source))] String),
    /// The response was valid JSON of the wrong shape
    #[display("unexpected response shape, expected {_0}")]
    UnexpectedShape(#[error(not(source))] &'static str),
    /// The page was fetched but could not be extracted
    #[display("could not extract {_0}")]
    Extract(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => TRANSIENT_STATUSES.contains(status),
            Self::Network(_) => true,
            Self::Decode(_) | Self::UnexpectedShape(_) | Self::Extract(_) => false,
        }
    }

    /// HTTP status of the failed request, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
