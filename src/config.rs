use crate::error::RetrieverError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "RETRIEVER_";

/// Runtime configuration.
///
/// Layered lowest to highest: built-in defaults, `config.toml` in the working
/// directory, then `RETRIEVER_*` environment variables (`__` separates sections,
/// e.g. `RETRIEVER_PROVIDER__CONSUMER_KEY`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub store: StoreConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
    /// Directory of `*.json` credential files saved into the store at startup.
    pub cred_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data.db".to_string(),
            cred_path: None,
        }
    }
}

/// Application credentials and outbound client settings for the OAuth provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub proxy: Option<Url>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            proxy: None,
            connect_timeout_secs: 5,
            timeout_secs: 15,
            user_agent: concat!("resource-retriever/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("proxy", &self.proxy)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate configuration from the standard layers.
    pub fn load() -> Result<Self, RetrieverError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, RetrieverError> {
        let cfg: Config = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RetrieverError> {
        if self.provider.consumer_key.trim().is_empty() {
            return Err(RetrieverError::InvalidConfig(
                "provider.consumer_key must be set".to_string(),
            ));
        }
        if self.provider.consumer_secret.trim().is_empty() {
            return Err(RetrieverError::InvalidConfig(
                "provider.consumer_secret must be set".to_string(),
            ));
        }
        if self.provider.connect_timeout_secs == 0 || self.provider.timeout_secs == 0 {
            return Err(RetrieverError::InvalidConfig(
                "provider timeouts must be at least one second".to_string(),
            ));
        }
        if self.store.database_url.trim().is_empty() {
            return Err(RetrieverError::InvalidConfig(
                "store.database_url must be set".to_string(),
            ));
        }
        Ok(())
    }
}
