//! The seam between request orchestration and the network.
//!
//! A [`Transport`] is chosen when a [`Client`](crate::Client) is built. The
//! production implementation is [`ReqwestTransport`]; tests supply scripted
//! transports of their own.

mod remote;
pub use remote::*;

#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use bce_auth::{Params, uri_encode};
use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use crate::error::TransportError;
use crate::response::Response;
use crate::sync::ConditionalSync;

/// A fully signed request, ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Service endpoint (scheme, host and optional port)
    pub endpoint: Url,
    /// HTTP method
    pub method: Method,
    /// Percent-encoded request path
    pub path: String,
    /// Request headers, including `authorization`
    pub headers: HeaderMap,
    /// Query parameters
    pub params: Params,
    /// Request body
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// The full request URL.
    ///
    /// Query keys and values are percent-encoded; a parameter without a
    /// value is rendered as a bare key.
    pub fn url(&self) -> String {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = format!("{}{}", base, self.path);

        let query: Vec<String> = self
            .params
            .iter()
            .map(|(key, value)| match value {
                Some(value) => format!("{}={}", uri_encode(key, true), uri_encode(value, true)),
                None => uri_encode(key, true),
            })
            .collect();

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }
}

/// Sends signed requests and decodes their responses.
///
/// Implementations decode failures once, into a [`TransportError`]; error
/// statuses become [`TransportError::Service`].
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport: ConditionalSync {
    /// Send `request` and wait for its response.
    async fn dispatch(&self, request: HttpRequest) -> Result<Response, TransportError>;
}
