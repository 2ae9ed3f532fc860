use async_trait::async_trait;

use crate::error::TransportError;
use crate::response::{Response, decode};
use crate::transport::{HttpRequest, Transport};

/// A [`Transport`] backed by `reqwest`, on native targets and in the browser.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with an optional per-request timeout.
    ///
    /// The timeout is ignored on wasm, where the browser owns it.
    pub fn new(timeout_seconds: Option<u64>) -> Result<Self, TransportError> {
        #[allow(unused_mut)]
        let mut client_builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(timeout) = timeout_seconds {
                client_builder = client_builder.timeout(std::time::Duration::from_secs(timeout));
            }
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_seconds;

        let client = client_builder
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Transport for ReqwestTransport {
    async fn dispatch(&self, request: HttpRequest) -> Result<Response, TransportError> {
        let url = request.url();
        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        Ok(decode(status, &headers, &bytes)?)
    }
}
