//! Long-term BCE access credentials.

use serde::{Deserialize, Serialize};

/// An access key / secret key pair.
///
/// Credentials are owned by the caller and only borrowed while a request is
/// signed; nothing in this crate stores them.
///
/// # Example
///
/// ```
/// use bce_auth::Credentials;
///
/// let credentials = Credentials::new("my-access-key", "my-secret-key");
/// assert_eq!(credentials.access_key(), "my-access-key");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// BCE Access Key ID
    access_key: String,
    /// BCE Secret Access Key
    secret_key: String,
}

impl Credentials {
    /// Create credentials from an access key and a secret key.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Get the access key.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Get the secret key.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
