//! Recognizing clock-skew rejections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Error code the service uses for a timestamp outside the signature window.
pub const REQUEST_TIME_TOO_SKEWED: &str = "RequestTimeTooSkewed";

/// Which service errors count as clock-skew rejections.
///
/// The codes are an explicit allow-list so a change in the service's error
/// taxonomy can be handled through configuration.
///
/// ```
/// use bos_client::SkewPolicy;
///
/// let policy = SkewPolicy::default().with_code("SignatureExpired");
/// assert_eq!(policy.status(), 403);
/// assert_eq!(policy.codes(), ["RequestTimeTooSkewed", "SignatureExpired"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkewPolicy {
    status: u16,
    codes: Vec<String>,
}

impl Default for SkewPolicy {
    fn default() -> Self {
        Self {
            status: 403,
            codes: vec![REQUEST_TIME_TOO_SKEWED.to_string()],
        }
    }
}

impl SkewPolicy {
    /// Match the given status and any of the given codes.
    pub fn new(status: u16, codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            status,
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Also match `code`.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.codes.push(code.into());
        self
    }

    /// The HTTP status of a skew rejection.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The matching service error codes.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Whether `error` is a skew rejection.
    pub fn is_skew(&self, error: &ServiceError) -> bool {
        error.status == self.status
            && error
                .code
                .as_deref()
                .is_some_and(|code| self.codes.iter().any(|c| c == code))
    }

    /// The server's clock, if `error` is a skew rejection that reports it.
    pub fn server_time(&self, error: &ServiceError) -> Option<DateTime<Utc>> {
        if self.is_skew(error) { error.date } else { None }
    }
}
