use crate::config::ProviderConfig;
use crate::error::RetrieverError;
use crate::oauth::{AccessToken, RequestSigner};
use futures::future::BoxFuture;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub type FetchFuture<'a> = BoxFuture<'a, Result<String, RetrieverError>>;

/// Issues one authorized GET on behalf of the holder of `token` and returns the
/// raw response body.
pub trait ResourceFetcher: Send + Sync {
    fn fetch<'a>(&'a self, token: &'a AccessToken, url: &'a Url) -> FetchFuture<'a>;
}

pub struct OAuthFetcher {
    client: reqwest::Client,
    signer: Arc<dyn RequestSigner>,
}

impl OAuthFetcher {
    pub fn new(client: reqwest::Client, signer: Arc<dyn RequestSigner>) -> Self {
        Self { client, signer }
    }

    /// Outbound client with the configured timeouts, user agent and optional proxy.
    pub fn build_client(cfg: &ProviderConfig) -> Result<reqwest::Client, RetrieverError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs));
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        Ok(builder.build()?)
    }

    async fn get(&self, token: &AccessToken, url: &Url) -> Result<String, RetrieverError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RetrieverError::UnsupportedScheme(url.scheme().to_string()));
        }

        let authorization = self.signer.authorization(&Method::GET, url, token)?;
        let resp = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(url = %url, %status, "upstream rejected protected resource request");
            return Err(RetrieverError::UpstreamStatus(status));
        }

        let body = resp.text().await?;
        debug!(url = %url, bytes = body.len(), "fetched protected resource");
        Ok(body)
    }
}

impl ResourceFetcher for OAuthFetcher {
    fn fetch<'a>(&'a self, token: &'a AccessToken, url: &'a Url) -> FetchFuture<'a> {
        Box::pin(self.get(token, url))
    }
}
