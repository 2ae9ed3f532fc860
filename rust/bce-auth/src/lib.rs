#![warn(missing_docs)]

//! BCE v1 request signing.
//!
//! This crate produces the `Authorization` header value expected by Baidu
//! Object Storage (BOS) and other services speaking the `bce-auth-v1`
//! scheme. It is pure computation: no I/O, no async, no hidden state.
//!
//! Signing happens in two chained HMAC-SHA256 steps:
//!
//! 1. A session key is derived from the secret key and a descriptor of the
//!    form `bce-auth-v1/{access_key}/{timestamp}/{expiration}`.
//! 2. The session key signs the canonical request, which is built from the
//!    HTTP method, the canonical URI, the canonical query string and the
//!    canonical header block (see [`canonical`]).
//!
//! # Example
//!
//! ```
//! use bce_auth::{Credentials, Params, Signer};
//! use chrono::{TimeZone, Utc};
//! use http::{HeaderMap, HeaderValue, Method};
//!
//! # fn example() -> Result<(), bce_auth::AuthorizationError> {
//! let credentials = Credentials::new("ak", "sk");
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("host", HeaderValue::from_static("x.com"));
//!
//! let token = Signer::new(&credentials)
//!     .with_timestamp(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
//!     .sign(&Method::PUT, "/v1/bucket/key", &Params::new(), &headers)?;
//!
//! assert!(token.to_string().starts_with("bce-auth-v1/ak/2020-01-01T00:00:00Z/1800/host/"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod canonical;
pub mod credentials;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod signer;

pub use canonical::{CanonicalRequest, DEFAULT_HEADERS_TO_SIGN, Params};
pub use credentials::Credentials;
pub use encoding::{byte_size, normalize_path, uri_encode};
pub use error::AuthorizationError;
pub use signer::{
    AUTH_VERSION, DEFAULT_EXPIRATION_SECONDS, SignedToken, Signer, format_timestamp, sign,
};
