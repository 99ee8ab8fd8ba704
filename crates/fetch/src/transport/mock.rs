//! Scripted transport for testing.

use super::{Response, Transport};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-memory [`Transport`] that replays scripted responses.
///
/// Responses for a URL are served in the order they were added; the last
/// one is repeated forever. Unknown URLs answer `404`. Every request is
/// counted, so tests can assert how many requests a cache let through.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

#[derive(Clone)]
enum Scripted {
    Response(Response),
    Unreachable,
}

impl MockTransport {
    /// Queues a response for a URL.
    pub fn with_response(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.script(url, Scripted::Response(Response::new(status, body)))
    }

    /// Queues a connection failure for a URL.
    pub fn with_network_error(self, url: impl Into<String>) -> Self {
        self.script(url, Scripted::Unreachable)
    }

    /// Delays every response, so that concurrent requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn script(mut self, url: impl Into<String>, scripted: Scripted) -> Self {
        self.responses.get_mut().entry(url.into()).or_default().push_back(scripted);
        self
    }

    /// Number of requests made for a URL so far.
    pub async fn calls(&self, url: &str) -> usize {
        self.calls.lock().await.get(url).copied().unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<Response> {
        *self.calls.lock().await.entry(url.to_string()).or_default() += 1;
        let scripted = {
            let mut responses = self.responses.lock().await;
            match responses.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match scripted {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Unreachable) => Err(exn::Exn::from(ErrorKind::Network(url.to_string()))),
            None => Ok(Response::new(404, "")),
        }
    }
}
