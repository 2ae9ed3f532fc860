//! Client configuration.
//!
//! A [`Config`] can be built in code, deserialized, or read from the
//! `BOS_ENDPOINT` and `BCE_*` environment variables with [`Config::from_env`].

use bce_auth::{Credentials, DEFAULT_EXPIRATION_SECONDS};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientError;
use crate::skew::SkewPolicy;

/// Environment variable holding the service endpoint.
pub const ENDPOINT_VAR: &str = "BOS_ENDPOINT";
/// Environment variable holding the access key id.
pub const ACCESS_KEY_VAR: &str = "BCE_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const SECRET_KEY_VAR: &str = "BCE_SECRET_ACCESS_KEY";
/// Environment variable holding an optional STS session token.
pub const SESSION_TOKEN_VAR: &str = "BCE_SESSION_TOKEN";

fn default_expiration_seconds() -> u64 {
    DEFAULT_EXPIRATION_SECONDS
}

fn default_timeout_seconds() -> Option<u64> {
    Some(30)
}

/// Configuration for a [`Client`](crate::Client).
///
/// ```
/// use bce_auth::Credentials;
/// use bos_client::Config;
///
/// let config = Config::new("https://bj.bcebos.com", Credentials::new("ak", "sk"))
///     .with_session_token("token")
///     .with_expiration_seconds(600);
///
/// assert_eq!(config.expiration_seconds(), 600);
/// assert_eq!(config.session_token(), Some("token"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    endpoint: String,
    credentials: Credentials,
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default = "default_expiration_seconds")]
    expiration_seconds: u64,
    #[serde(default)]
    skew: SkewPolicy,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: Option<u64>,
}

impl Config {
    /// Create a configuration with default expiration, skew policy and timeout.
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            session_token: None,
            expiration_seconds: DEFAULT_EXPIRATION_SECONDS,
            skew: SkewPolicy::default(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Read the configuration from `BOS_ENDPOINT`, `BCE_ACCESS_KEY_ID`,
    /// `BCE_SECRET_ACCESS_KEY` and the optional `BCE_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self, ClientError> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| ClientError::Configuration(format!("{} is not set", name)))
        };

        let config = Self::new(
            var(ENDPOINT_VAR)?,
            Credentials::new(var(ACCESS_KEY_VAR)?, var(SECRET_KEY_VAR)?),
        );

        Ok(match std::env::var(SESSION_TOKEN_VAR) {
            Ok(token) if !token.is_empty() => config.with_session_token(token),
            _ => config,
        })
    }

    /// Attach an STS session token, sent as `x-bce-security-token`.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Set how long each signature stays valid.
    pub fn with_expiration_seconds(mut self, seconds: u64) -> Self {
        self.expiration_seconds = seconds;
        self
    }

    /// Replace the clock-skew matching policy.
    pub fn with_skew_policy(mut self, skew: SkewPolicy) -> Self {
        self.skew = skew;
        self
    }

    /// Set the request timeout; `None` disables it.
    pub fn with_timeout_seconds(mut self, seconds: Option<u64>) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// The raw endpoint string.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The signing credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The STS session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Signature validity window in seconds.
    pub fn expiration_seconds(&self) -> u64 {
        self.expiration_seconds
    }

    /// The clock-skew matching policy.
    pub fn skew(&self) -> &SkewPolicy {
        &self.skew
    }

    /// Request timeout in seconds.
    pub fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    /// The endpoint parsed as a URL.
    ///
    /// An endpoint without a scheme is treated as `https`.
    pub fn endpoint_url(&self) -> Result<Url, ClientError> {
        let endpoint = self.endpoint.trim();
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };

        let url = Url::parse(&endpoint).map_err(|error| {
            ClientError::Configuration(format!("invalid endpoint `{}`: {}", self.endpoint, error))
        })?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ClientError::Configuration(format!(
                "endpoint `{}` has no host",
                self.endpoint
            )));
        }
        Ok(url)
    }
}
