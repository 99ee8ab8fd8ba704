use crate::FetchOptions;
use crate::cache::TtlCache;
use crate::error::{ErrorKind, Result};
use crate::retry::{Backoff, RetryOn, RetryPolicy};
use crate::transport::{ReqwestTransport, Transport};
use exn::ResultExt;
use paldeck_extract::models::{PalDetail, PalSummary};
use paldeck_extract::{Site, extract_detail, extract_list};
use std::sync::Arc;
use tracing::instrument;

/// Slug of the page listing every pal.
pub const LIST_PAGE: &str = "Pals";

/// Fetches and extracts wiki pages, caching the extracted records.
///
/// Extraction happens inside the shared fetch, so concurrent callers for one
/// page share the parse as well as the request.
pub struct WikiClient {
    transport: Arc<dyn Transport>,
    site: Site,
    retry: RetryPolicy,
    list: TtlCache<(), Vec<PalSummary>>,
    details: TtlCache<String, PalDetail>,
}
impl WikiClient {
    /// Client using [`ReqwestTransport`] and exponential backoff.
    pub fn new(site: Site, options: &FetchOptions) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new(options)?), site, options))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, site: Site, options: &FetchOptions) -> Self {
        Self {
            transport,
            site,
            retry: options.retry.clone().with_backoff(Backoff::Exponential).with_retry_on(RetryOn::Transient),
            list: TtlCache::new(options.ttl),
            details: TtlCache::new(options.ttl),
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Every pal on the list page.
    #[instrument(skip(self))]
    pub async fn list(&self, force: bool) -> Result<Arc<Vec<PalSummary>>> {
        let transport = Arc::clone(&self.transport);
        let site = self.site.clone();
        let retry = self.retry.clone();
        self.list
            .get_or_fetch((), force, move || async move {
                let url = site.page_url(LIST_PAGE);
                let response = retry.get(transport.as_ref(), &url).await?;
                extract_list(&response.body, &site).or_raise(|| ErrorKind::Extract(url))
            })
            .await
    }

    /// The detail record of one pal.
    #[instrument(skip(self))]
    pub async fn detail(&self, slug: &str, force: bool) -> Result<Arc<PalDetail>> {
        let transport = Arc::clone(&self.transport);
        let site = self.site.clone();
        let retry = self.retry.clone();
        let owned = slug.to_string();
        self.details
            .get_or_fetch(slug.to_string(), force, move || async move {
                let url = site.page_url(&owned);
                let response = retry.get(transport.as_ref(), &url).await?;
                extract_detail(&response.body, &owned, &site).or_raise(|| ErrorKind::Extract(url))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::Duration;

    const LIST_URL: &str = "https://paldb.cc/en/Pals";
    const DETAIL_URL: &str = "https://paldb.cc/en/Lamball";
    const LIST_HTML: &str = r#"<div class="col"><a href="/en/Lamball">Lamball</a> #1</div>"#;
    const DETAIL_HTML: &str = r#"<div class="card"><h1 class="pal-name">Lamball #1</h1></div>
        <div class="card"><h5 class="card-title">Tribes</h5><table><tr><td><a href="/en/Lamball">Lamball</a></td><td>Tribe Boss</td></tr></table></div>"#;

    fn options() -> FetchOptions {
        FetchOptions {
            retry: RetryPolicy { base_delay: Duration::from_millis(10), ..RetryPolicy::default() },
            ..FetchOptions::default()
        }
    }

    fn client(transport: &Arc<MockTransport>) -> WikiClient {
        WikiClient::with_transport(Arc::clone(transport) as Arc<dyn Transport>, Site::default(), &options())
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_is_cached() {
        let transport = Arc::new(MockTransport::default().with_response(LIST_URL, 200, LIST_HTML));
        let client = client(&transport);
        let list = client.list(false).await.unwrap();
        assert_eq!(list[0].slug, "Lamball");
        client.list(false).await.unwrap();
        assert_eq!(transport.calls(LIST_URL).await, 1);
        client.list(true).await.unwrap();
        assert_eq!(transport.calls(LIST_URL).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_detail_requests_share_one_fetch() {
        let transport = Arc::new(
            MockTransport::default()
                .with_response(DETAIL_URL, 503, "")
                .with_response(DETAIL_URL, 200, DETAIL_HTML)
                .with_delay(Duration::from_millis(50)),
        );
        let client = client(&transport);
        let (a, b) = tokio::join!(client.detail("Lamball", false), client.detail("Lamball", false));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.number, 1);
        assert!(a.is_alpha());
        // One failed attempt, one retry, shared by both callers.
        assert_eq!(transport.calls(DETAIL_URL).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_page_and_empty_body() {
        let transport = Arc::new(MockTransport::default().with_response(DETAIL_URL, 200, "  "));
        let client = client(&transport);
        let err = client.detail("Nope", false).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        let err = client.detail("Lamball", false).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Extract(url) if url == DETAIL_URL));
    }
}
