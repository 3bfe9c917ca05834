use crate::api::fetcher::ResourceFetcher;
use crate::error::RetrieverError;
use crate::service::gateway::CredentialGateway;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Response body returned when no credential is registered for the screen name.
pub const CREDENTIALS_NOT_FOUND: &str = "OAuth Credentials Not Found";

/// Composes the credential lookup with the authorized fetch.
#[derive(Clone)]
pub struct ResourceRetriever {
    gateway: Arc<dyn CredentialGateway>,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl ResourceRetriever {
    pub fn new(gateway: Arc<dyn CredentialGateway>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { gateway, fetcher }
    }

    /// Fetch `target` as `screen_name`.
    ///
    /// The lookup runs first. An unknown screen name is not an error: the
    /// not-found sentinel is returned and `target` is never inspected. Only once
    /// a credential exists is `target` required to be an http(s) URL. Store and
    /// fetch failures propagate unchanged.
    pub async fn request_resource(
        &self,
        screen_name: &str,
        target: Option<&str>,
    ) -> Result<String, RetrieverError> {
        debug!(screen_name, url = target.unwrap_or("<none>"), "get protected resource");

        match self.gateway.lookup(screen_name).await? {
            Some(cred) => {
                let url = parse_target(target)?;
                self.fetcher.fetch(&cred.token(), &url).await
            }
            None => {
                info!(screen_name, "no credentials found for user");
                Ok(CREDENTIALS_NOT_FOUND.to_string())
            }
        }
    }
}

/// Validate the caller-supplied URL to fetch.
pub fn parse_target(raw: Option<&str>) -> Result<Url, RetrieverError> {
    let raw = raw.ok_or(RetrieverError::MissingParameter("url-to-fetch"))?;
    let url = Url::parse(raw).map_err(RetrieverError::InvalidTargetUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RetrieverError::UnsupportedScheme(url.scheme().to_string()));
    }
    Ok(url)
}
