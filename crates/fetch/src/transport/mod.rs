//! The HTTP seam.
//!
//! Everything above this module talks to a [`Transport`], so the cache, the
//! retry loop and the clients can be exercised without a network.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::ReqwestTransport;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockTransport;
use crate::error::Result;
use async_trait::async_trait;

/// A response as far as the clients care: status and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}
impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single GET request.
///
/// Implementations return `Ok` for every response the server sent,
/// whatever its status; deciding what a status means is up to the caller.
/// `Err` is reserved for requests that produced no response at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Response>;
}
