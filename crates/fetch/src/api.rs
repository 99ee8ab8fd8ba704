//! Client for a JSON-REST data provider.
//!
//! The provider already serves structured data, so there is nothing to
//! extract: responses are deserialised, cached as-is and shared.

use crate::FetchOptions;
use crate::cache::TtlCache;
use crate::error::{ErrorKind, Result};
use crate::retry::{Backoff, RetryOn, RetryPolicy};
use crate::transport::{ReqwestTransport, Transport};
use exn::{OptionExt, ResultExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    retry: RetryPolicy,
    cache: TtlCache<String, Value>,
}
impl ApiClient {
    /// Client using [`ReqwestTransport`] and linear backoff.
    ///
    /// Any 5xx is retried, along with 408 and 429, since API gateways report
    /// upstream trouble with non-standard codes such as 522.
    pub fn new(base_url: impl Into<String>, options: &FetchOptions) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new(options)?), base_url, options))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, base_url: impl Into<String>, options: &FetchOptions) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: options.retry.clone().with_backoff(Backoff::Linear).with_retry_on(RetryOn::ServerErrors),
            cache: TtlCache::new(options.ttl),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetches a path and deserialises it.
    #[instrument(skip(self))]
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, force: bool) -> Result<T> {
        let value = self.value(path, force).await?;
        T::deserialize(value.as_ref()).or_raise(|| ErrorKind::Decode(self.url(path)))
    }

    /// Fetches a path that holds a single object.
    ///
    /// Some endpoints wrap a single record in an array; the first element is
    /// used in that case. Anything that is not (or does not contain) an
    /// object is [`ErrorKind::UnexpectedShape`].
    #[instrument(skip(self))]
    pub async fn fetch_object<T: DeserializeOwned>(&self, path: &str, force: bool) -> Result<T> {
        let value = self.value(path, force).await?;
        let object = match value.as_ref() {
            Value::Array(items) => items.first(),
            other => Some(other),
        }
        .filter(|value| value.is_object())
        .ok_or_raise(|| ErrorKind::UnexpectedShape("object"))?;
        T::deserialize(object).or_raise(|| ErrorKind::Decode(self.url(path)))
    }

    async fn value(&self, path: &str, force: bool) -> Result<Arc<Value>> {
        let url = self.url(path);
        let transport = Arc::clone(&self.transport);
        let retry = self.retry.clone();
        self.cache
            .get_or_fetch(url.clone(), force, move || async move {
                let response = retry.get(transport.as_ref(), &url).await?;
                serde_json::from_str(&response.body).or_raise(|| ErrorKind::Decode(url))
            })
            .await
    }
}
