//! Decoding of raw HTTP responses.
//!
//! Transports hand the status, headers and body of a response to [`decode`],
//! which produces either a [`Response`] or a [`ServiceError`]. Nothing past
//! this boundary looks at raw status codes or error payloads.

use std::collections::BTreeMap;

use bce_auth::headers::{CONTENT_TYPE, DATE, ETAG, X_BCE_DATE, X_BCE_REQUEST_ID};
use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode};
use serde_json::Value;

use crate::error::ServiceError;

/// Message used when the service answers with an informational status.
pub const INFORMATIONAL_STATUS_MESSAGE: &str = "Can not handle 1xx http status code.";

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// No body, or only whitespace.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// Any other textual body.
    Text(String),
}

impl Body {
    /// Decode `bytes` according to the response content type.
    ///
    /// JSON content types whose body fails to parse fall back to text.
    pub fn decode(content_type: Option<&str>, bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            return Body::Empty;
        }

        if content_type.is_some_and(is_json)
            && let Ok(value) = serde_json::from_str(&text)
        {
            return Body::Json(value);
        }

        Body::Text(text.into_owned())
    }

    /// The JSON document, if the body is one.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if the body is plain text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A successful service response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: BTreeMap<String, String>,
    body: Body,
}

impl Response {
    /// Create a response from already-normalized parts.
    pub fn new(status: StatusCode, headers: BTreeMap<String, String>, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Normalized response headers, keyed by lower-case name.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// A single header by lower-case name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The decoded body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consume the response, returning its body.
    pub fn into_body(self) -> Body {
        self.body
    }
}

/// Normalize response headers.
///
/// Names are lower-cased, values trimmed, empty values dropped, and every
/// quote in `etag` removed. Values that are not valid UTF-8 are skipped.
/// Only the first value of a repeated header is kept.
pub fn fix_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut fixed = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let name = name.as_str().to_ascii_lowercase();
        let value = if name == ETAG {
            value.replace('"', "")
        } else {
            value.to_string()
        };
        fixed.entry(name).or_insert(value);
    }
    fixed
}

/// Turn a raw response into a [`Response`] or a [`ServiceError`].
pub fn decode(status: StatusCode, headers: &HeaderMap, bytes: &[u8]) -> Result<Response, ServiceError> {
    let fixed = fix_headers(headers);

    if status.is_informational() {
        return Err(ServiceError::new(status.as_u16()).with_message(INFORMATIONAL_STATUS_MESSAGE));
    }

    let body = Body::decode(fixed.get(CONTENT_TYPE).map(String::as_str), bytes);

    if status.is_success() {
        return Ok(Response::new(status, fixed, body));
    }

    Err(service_error(status, &fixed, body))
}

fn service_error(status: StatusCode, headers: &BTreeMap<String, String>, body: Body) -> ServiceError {
    let mut error = ServiceError::new(status.as_u16());

    match body {
        Body::Json(value) if value.get("requestId").is_some() => {
            let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
            error.code = field("code");
            error.message = field("message");
            error.request_id = field("requestId");
            error.date = server_date(headers);
        }
        Body::Json(value) => error.message = Some(value.to_string()),
        Body::Text(text) => error.message = Some(text),
        Body::Empty => {}
    }

    if error.request_id.is_none() {
        error.request_id = headers.get(X_BCE_REQUEST_ID).cloned();
    }
    error
}

/// The server clock as reported by `date`, or failing that `x-bce-date`.
fn server_date(headers: &BTreeMap<String, String>) -> Option<DateTime<Utc>> {
    headers
        .get(DATE)
        .and_then(|date| DateTime::parse_from_rfc2822(date).ok())
        .or_else(|| {
            headers
                .get(X_BCE_DATE)
                .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
        })
        .map(|date| date.with_timezone(&Utc))
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence == "text/json"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use http::HeaderValue;

    fn header_map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn it_fixes_headers() {
        let headers = header_map(&[
            ("etag", "\"abc123\""),
            ("x-bce-request-id", "  id-1  "),
            ("x-bce-debug-id", "   "),
        ]);

        let fixed = fix_headers(&headers);
        assert_eq!(fixed.get("etag").map(String::as_str), Some("abc123"));
        assert_eq!(fixed.get("x-bce-request-id").map(String::as_str), Some("id-1"));
        assert!(!fixed.contains_key("x-bce-debug-id"));
    }

    #[test]
    fn it_strips_every_quote_from_etag() {
        let headers = header_map(&[("etag", "W/\"ab\"c\"")]);

        let fixed = fix_headers(&headers);
        assert_eq!(fixed.get("etag").map(String::as_str), Some("W/abc"));
    }

    #[test]
    fn it_decodes_json_success() {
        let headers = header_map(&[("content-type", "application/json; charset=utf-8")]);
        let response = decode(StatusCode::OK, &headers, br#"{"ok":true}"#).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_json(), Some(&serde_json::json!({"ok": true})));
    }

    #[test]
    fn it_decodes_text_and_empty_bodies() {
        let text = decode(StatusCode::OK, &header_map(&[("content-type", "text/plain")]), b"hi").unwrap();
        assert_eq!(text.body().as_text(), Some("hi"));

        let empty = decode(StatusCode::OK, &HeaderMap::new(), b"  \n").unwrap();
        assert_eq!(empty.body(), &Body::Empty);
    }

    #[test]
    fn it_decodes_service_error_with_request_id() {
        let headers = header_map(&[
            ("content-type", "application/json"),
            ("date", "Wed, 01 Jan 2020 01:00:00 GMT"),
        ]);
        let body = br#"{"code":"RequestTimeTooSkewed","message":"skewed","requestId":"r-1"}"#;

        let error = decode(StatusCode::FORBIDDEN, &headers, body).unwrap_err();
        assert_eq!(error.status, 403);
        assert_eq!(error.code.as_deref(), Some("RequestTimeTooSkewed"));
        assert_eq!(error.message.as_deref(), Some("skewed"));
        assert_eq!(error.request_id.as_deref(), Some("r-1"));
        assert_eq!(error.date, Some(Utc.with_ymd_and_hms(2020, 1, 1, 1, 0, 0).unwrap()));
    }

    #[test]
    fn it_falls_back_to_bce_date() {
        let headers = header_map(&[
            ("content-type", "application/json"),
            ("x-bce-date", "2020-01-01T01:00:00Z"),
        ]);
        let body = br#"{"code":"RequestTimeTooSkewed","message":"skewed","requestId":"r-1"}"#;

        let error = decode(StatusCode::FORBIDDEN, &headers, body).unwrap_err();
        assert_eq!(error.date, Some(Utc.with_ymd_and_hms(2020, 1, 1, 1, 0, 0).unwrap()));
    }

    #[test]
    fn it_uses_text_body_as_message() {
        let error = decode(StatusCode::BAD_GATEWAY, &HeaderMap::new(), b"upstream down").unwrap_err();

        assert_eq!(error.status, 502);
        assert_eq!(error.code, None);
        assert_eq!(error.message.as_deref(), Some("upstream down"));
    }

    #[test]
    fn it_leaves_empty_error_message_unset() {
        let headers = header_map(&[("x-bce-request-id", "r-2")]);
        let error = decode(StatusCode::NOT_FOUND, &headers, b"").unwrap_err();

        assert_eq!(error.message, None);
        assert_eq!(error.request_id.as_deref(), Some("r-2"));
    }

    #[test]
    fn it_rejects_informational_status() {
        let error = decode(StatusCode::CONTINUE, &HeaderMap::new(), b"").unwrap_err();
        assert_eq!(error.status, 100);
        assert_eq!(error.message.as_deref(), Some(INFORMATIONAL_STATUS_MESSAGE));
    }
}
