//! Bounded retries of transient HTTP failures.

use crate::error::{Error, ErrorKind, Result};
use crate::transport::{Response, Transport};
use backon::{BackoffBuilder, ExponentialBuilder, Retryable};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Statuses worth another attempt: timeouts, rate limiting and gateway errors.
pub const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base × attempt`
    Linear,
    /// `base × 2^(attempt - 1)`
    Exponential,
}

/// Which failed responses get another attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryOn {
    /// Only [`TRANSIENT_STATUSES`].
    #[default]
    Transient,
    /// Any 5xx, plus 408 and 429.
    ServerErrors,
}
impl RetryOn {
    pub fn matches(self, status: u16) -> bool {
        match self {
            Self::Transient => TRANSIENT_STATUSES.contains(&status),
            Self::ServerErrors => matches!(status, 408 | 429 | 500..=599),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    pub backoff: Backoff,
    pub retry_on: RetryOn,
}
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff: Backoff::Exponential,
            retry_on: RetryOn::Transient,
        }
    }
}
impl RetryPolicy {
    /// The same policy with a different backoff curve.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// The same policy retrying a different set of statuses.
    pub fn with_retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }

    fn retries(&self) -> usize {
        usize::try_from(self.max_attempts.saturating_sub(1)).unwrap_or(usize::MAX)
    }

    fn exponential(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.retries())
    }

    fn linear(&self) -> LinearBackoff {
        LinearBackoff { step: self.base_delay, max_delay: self.max_delay, attempt: 0, max_times: self.retries() }
    }

    /// GETs a URL, retrying the statuses selected by [`RetryOn`].
    ///
    /// Returns the first successful response. Any other status, or a
    /// retryable one on the last attempt, becomes [`ErrorKind::Http`].
    /// Transport errors are returned as they are, without retrying.
    pub async fn get(&self, transport: &dyn Transport, url: &str) -> Result<Response> {
        match self.backoff {
            Backoff::Linear => self.get_with(self.linear(), transport, url).await,
            Backoff::Exponential => self.get_with(self.exponential(), transport, url).await,
        }
    }

    async fn get_with<B: BackoffBuilder>(&self, backoff: B, transport: &dyn Transport, url: &str) -> Result<Response> {
        (|| get_once(transport, url))
            .retry(backoff)
            .sleep(sleep)
            .when(|err: &Error| err.status().is_some_and(|status| self.retry_on.matches(status)))
            .notify(|err: &Error, delay: Duration| {
                warn!(url, status = ?err.status(), ?delay, "transient HTTP status, retrying");
            })
            .await
    }
}

async fn get_once(transport: &dyn Transport, url: &str) -> Result<Response> {
    let response = transport.get(url).await?;
    if !response.is_success() {
        exn::bail!(ErrorKind::Http { status: response.status, url: url.to_string() });
    }
    Ok(response)
}

/// `step × attempt`, capped at `max_delay`.
#[derive(Debug, Clone)]
struct LinearBackoff {
    step: Duration,
    max_delay: Duration,
    attempt: usize,
    max_times: usize,
}
impl Iterator for LinearBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_times {
            return None;
        }
        self.attempt += 1;
        let factor = u32::try_from(self.attempt).unwrap_or(u32::MAX);
        Some(self.step.saturating_mul(factor).min(self.max_delay))
    }
}
