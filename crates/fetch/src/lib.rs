//! Fetching wiki pages and JSON data behind a single-flight TTL cache.
//!
//! [`WikiClient`] fetches HTML pages and hands them to the extractor;
//! [`ApiClient`] serves a JSON-REST provider. Both share the same
//! [`TtlCache`], [`RetryPolicy`] and [`Transport`] plumbing.

mod api;
mod cache;
pub mod error;
mod retry;
pub mod transport;
mod wiki;

pub use self::api::ApiClient;
pub use self::cache::TtlCache;
pub use self::retry::{Backoff, RetryOn, RetryPolicy, TRANSIENT_STATUSES};
pub use self::transport::{ReqwestTransport, Response, Transport};
pub use self::wiki::{LIST_PAGE, WikiClient};
use std::time::Duration;

/// How long fetched records stay fresh by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every client.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub ttl: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}
impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryPolicy::default(),
        }
    }
}
