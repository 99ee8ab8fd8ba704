use super::{Response, Transport};
use crate::FetchOptions;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use tracing::instrument;

/// [`Transport`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}
impl ReqwestTransport {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()
            .or_raise(|| ErrorKind::Network("could not build HTTP client".to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::Network(url.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.or_raise(|| ErrorKind::Decode(url.to_string()))?;
        Ok(Response { status, body })
    }
}
