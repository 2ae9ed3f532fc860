//! Signing error types.

use thiserror::Error;

/// Errors that can occur while producing an authorization token.
///
/// Neither variant is recoverable by retrying: both indicate that the
/// inputs (or the environment) are unusable for signing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The request could not be canonicalized, e.g. a header value is not
    /// representable as text.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    /// The HMAC primitive rejected its input.
    #[error("signing failed: {0}")]
    Signing(String),
}
