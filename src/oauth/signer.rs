//! OAuth 1.0a (RFC 5849) HMAC-SHA1 request signing.

use super::credentials::{AccessToken, ConsumerCredentials};
use crate::error::RetrieverError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Method;
use sha1::Sha1;
use url::Url;
use urlencoding::encode;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Produces the `Authorization` header value for an outbound request made on
/// behalf of the holder of `token`.
pub trait RequestSigner: Send + Sync {
    fn authorization(
        &self,
        method: &Method,
        url: &Url,
        token: &AccessToken,
    ) -> Result<String, RetrieverError>;
}

/// Signs with the application's consumer pair plus the user's token pair.
#[derive(Debug, Clone)]
pub struct HmacSha1Signer {
    consumer: ConsumerCredentials,
}

impl HmacSha1Signer {
    pub fn new(consumer: ConsumerCredentials) -> Self {
        Self { consumer }
    }

    /// Deterministic signing with caller-supplied nonce and timestamp.
    /// `form` carries url-encoded body parameters, empty for GET.
    pub fn sign_with(
        &self,
        method: &Method,
        url: &Url,
        form: &[(&str, &str)],
        token: &AccessToken,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, RetrieverError> {
        let timestamp = timestamp.to_string();
        let protocol: [(&str, &str); 6] = [
            ("oauth_consumer_key", self.consumer.key()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", token.token()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let params: Vec<(&str, &str)> = form.iter().chain(protocol.iter()).copied().collect();
        let base = signature_base_string(method, url, &params);
        let signature = self.signature(&base, token)?;

        let header = [
            ("oauth_consumer_key", self.consumer.key()),
            ("oauth_nonce", nonce),
            ("oauth_signature", signature.as_str()),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", token.token()),
            ("oauth_version", OAUTH_VERSION),
        ]
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

        Ok(format!("OAuth {header}"))
    }

    fn signature(&self, base: &str, token: &AccessToken) -> Result<String, RetrieverError> {
        let key = format!(
            "{}&{}",
            encode(self.consumer.secret()),
            encode(token.secret())
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| RetrieverError::Signing(e.to_string()))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl RequestSigner for HmacSha1Signer {
    fn authorization(
        &self,
        method: &Method,
        url: &Url,
        token: &AccessToken,
    ) -> Result<String, RetrieverError> {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();
        self.sign_with(method, url, &[], token, &nonce, timestamp)
    }
}

/// `METHOD&enc(base_url)&enc(normalized_params)`; query pairs of `url` are
/// always included alongside `params`.
pub(crate) fn signature_base_string(method: &Method, url: &Url, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k).into_owned(), encode(&v).into_owned()))
        .chain(
            params
                .iter()
                .map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned())),
        )
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&normalized)
    )
}

/// Scheme and host lowercased, default ports dropped, no query or fragment.
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}
