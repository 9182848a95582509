//! Client configuration and credentials.
//!
//! # Design
//! Credentials are passed in explicitly, never read from the process
//! environment. `ClientConfig` derives `Deserialize` so a host can load it
//! from whatever format it already uses; values that arrive that way are
//! validated again when a `WaasClient` is built from them.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.tangany.com/v1/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Authentication triple sent as headers on every request.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    subscription: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let credentials = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            subscription: subscription.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Fails with `ApiError::Configuration` naming the first empty field.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("subscription", &self.subscription),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Configuration(format!("missing {field}")));
            }
        }
        Ok(())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription", &self.subscription)
            .finish()
    }
}

/// Everything a client needs: credentials, endpoint, timeout and wallet mode.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub credentials: Credentials,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        deserialize_with = "duration_from_secs"
    )]
    pub timeout: Duration,
    /// Create new wallets with HSM-backed keys instead of software keys.
    #[serde(default)]
    pub use_hsm: bool,
}

impl ClientConfig {
    /// Config against the production endpoint with default timeout and
    /// software wallets.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription: impl Into<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            credentials: Credentials::new(client_id, client_secret, subscription)?,
            base_url: default_base_url(),
            timeout: DEFAULT_TIMEOUT,
            use_hsm: false,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_hsm(mut self, use_hsm: bool) -> Self {
        self.use_hsm = use_hsm;
        self
    }

    /// Validate credentials and parse the base URL. The returned URL always
    /// ends with `/` so endpoint paths append below it.
    pub fn validate(&self) -> Result<Url, ApiError> {
        self.credentials.validate()?;
        if self.timeout.is_zero() {
            return Err(ApiError::Configuration("timeout must be non-zero".to_string()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Configuration(format!("invalid base url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ApiError::Configuration(format!(
                "base url must be an absolute http(s) url, got {:?}",
                self.base_url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
