//! Canonical request construction for `bce-auth-v1`.
//!
//! The string that gets signed is:
//!
//! ```text
//! HTTPMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders
//! ```
//!
//! Every piece is sorted and encoded so that two parties holding the same
//! request produce byte-identical strings, regardless of the order in which
//! parameters and headers were inserted.

use std::collections::BTreeMap;

use http::{HeaderMap, Method};

use crate::encoding::uri_encode;
use crate::error::AuthorizationError;
use crate::headers::{AUTHORIZATION, BCE_PREFIX, CONTENT_LENGTH, CONTENT_MD5, CONTENT_TYPE, HOST};

/// Query parameters of a request. A `None` value is signed as an empty value.
pub type Params = BTreeMap<String, Option<String>>;

/// Headers signed in addition to every `x-bce-*` header when the caller
/// does not provide an explicit list.
pub const DEFAULT_HEADERS_TO_SIGN: [&str; 4] = [HOST, CONTENT_MD5, CONTENT_LENGTH, CONTENT_TYPE];

/// The canonical form of a request, ready to be signed.
///
/// Built fresh for every signing attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    canonical_uri: String,
    canonical_query_string: String,
    canonical_headers: String,
    signed_headers: Vec<String>,
}

impl CanonicalRequest {
    /// Canonicalize a request.
    ///
    /// `headers_to_sign` replaces [`DEFAULT_HEADERS_TO_SIGN`] when given;
    /// `x-bce-*` headers are signed either way.
    pub fn new(
        method: &Method,
        path: &str,
        params: &Params,
        headers: &HeaderMap,
        headers_to_sign: Option<&[&str]>,
    ) -> Result<Self, AuthorizationError> {
        let (canonical_headers, signed_headers) = canonical_headers(headers, headers_to_sign)?;

        Ok(Self {
            method: method.as_str().to_string(),
            canonical_uri: canonical_uri(path),
            canonical_query_string: canonical_query_string(params),
            canonical_headers,
            signed_headers,
        })
    }

    /// The HTTP verb, e.g. `PUT`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The canonical URI.
    pub fn canonical_uri(&self) -> &str {
        &self.canonical_uri
    }

    /// The canonical query string.
    pub fn canonical_query_string(&self) -> &str {
        &self.canonical_query_string
    }

    /// The canonical header block.
    pub fn canonical_headers(&self) -> &str {
        &self.canonical_headers
    }

    /// Names of the headers covered by the signature, in canonical order.
    pub fn signed_headers(&self) -> &[String] {
        &self.signed_headers
    }

    /// The newline-joined string that the session key signs.
    pub fn raw_signature(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.method, self.canonical_uri, self.canonical_query_string, self.canonical_headers
        )
    }
}

/// Canonical URI of a request path.
///
/// The path must already be percent-encoded by the caller; it is used as-is.
pub fn canonical_uri(path: &str) -> String {
    path.to_string()
}

/// Canonical query string of a parameter map.
///
/// The `authorization` parameter (any case) is excluded. Each remaining
/// parameter becomes `key=uri_encode(value)`, and the pairs are sorted as
/// whole strings before being joined with `&`.
pub fn canonical_query_string(params: &Params) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .filter(|(key, _)| !key.eq_ignore_ascii_case(AUTHORIZATION))
        .map(|(key, value)| {
            let value = value.as_deref().unwrap_or_default();
            format!("{}={}", key, uri_encode(value, true))
        })
        .collect();

    pairs.sort();
    pairs.join("&")
}

/// Canonical header block and signed header names.
///
/// A header is included when its name starts with `x-bce-` or appears in
/// `headers_to_sign` (case-insensitive), and its trimmed value is not empty.
/// Each included header becomes `uri_encode(name):uri_encode(value)`; lines
/// are sorted and joined with `\n`.
pub fn canonical_headers(
    headers: &HeaderMap,
    headers_to_sign: Option<&[&str]>,
) -> Result<(String, Vec<String>), AuthorizationError> {
    let headers_to_sign: Vec<String> = headers_to_sign
        .unwrap_or(&DEFAULT_HEADERS_TO_SIGN[..])
        .iter()
        .map(|name| name.to_ascii_lowercase())
        .collect();

    let mut lines = Vec::new();
    for name in headers.keys() {
        // `HeaderName` is always lower-case.
        let name = name.as_str();
        if !name.starts_with(BCE_PREFIX) && !headers_to_sign.iter().any(|h| h == name) {
            continue;
        }

        let Some(value) = headers.get(name) else {
            continue;
        };
        let value = std::str::from_utf8(value.as_bytes()).map_err(|_| {
            AuthorizationError::Canonicalization(format!("header `{}` is not valid UTF-8", name))
        })?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        lines.push(format!("{}:{}", uri_encode(name, true), uri_encode(value, true)));
    }

    lines.sort();

    let signed_headers = lines
        .iter()
        .filter_map(|line| line.split(':').next())
        .map(str::to_string)
        .collect();

    Ok((lines.join("\n"), signed_headers))
}
