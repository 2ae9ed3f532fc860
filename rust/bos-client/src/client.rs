//! Signed request execution with one-shot clock-skew recovery.
//!
//! Every call goes through the same sequence: stamp `x-bce-date` with the
//! corrected clock, sign, dispatch. When the service rejects the request as
//! skewed and reports its own clock, the offset between the two clocks is
//! stored and the whole sequence runs once more. Any other failure, and a
//! second skew rejection, is surfaced to the caller.

use std::sync::Arc;

use bce_auth::headers::{AUTHORIZATION, HOST, X_BCE_DATE};
use bce_auth::{AuthorizationError, Params, Signer, format_timestamp};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::future::{AbortRegistration, Abortable, Aborted};
use http::{HeaderMap, HeaderValue, Method};
use url::Url;

use crate::clock::{Clock, ClockCorrection, ClockOffset, SystemClock, corrected_now};
use crate::config::Config;
use crate::error::{ClientError, TransportError};
use crate::response::Response;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};

/// How many times a request is re-signed after a clock-skew rejection.
const SKEW_RETRIES: usize = 1;

/// Executes signed requests against a BOS endpoint.
///
/// The clock offset is held behind an `Arc` so several clients talking to
/// the same service can share one correction.
pub struct Client<T: Transport = ReqwestTransport> {
    config: Config,
    transport: T,
    clock: Arc<dyn Clock>,
    clock_offset: Arc<dyn ClockCorrection>,
}

impl Client<ReqwestTransport> {
    /// Create a client that talks to the configured endpoint over HTTP.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.timeout_seconds())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Client<T> {
    /// Create a client that dispatches through `transport`.
    pub fn with_transport(config: Config, transport: T) -> Result<Self, ClientError> {
        config.endpoint_url()?;

        Ok(Self {
            config,
            transport,
            clock: Arc::new(SystemClock),
            clock_offset: Arc::new(ClockOffset::new()),
        })
    }

    /// Read the current time from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Store skew corrections in `clock_offset`.
    pub fn with_clock_offset(mut self, clock_offset: Arc<dyn ClockCorrection>) -> Self {
        self.clock_offset = clock_offset;
        self
    }

    /// The client configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The transport requests are dispatched through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The clock correction applied to signing timestamps.
    pub fn clock_offset(&self) -> &Arc<dyn ClockCorrection> {
        &self.clock_offset
    }

    /// Sign and send a request, retrying once after a clock-skew rejection.
    ///
    /// `path` must already be percent-encoded.
    pub async fn execute_signed_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        headers: HeaderMap,
        params: Params,
    ) -> Result<Response, ClientError> {
        self.execute_with_config(&self.config, method, path, body, headers, params)
            .await
    }

    /// Like [`execute_signed_request`](Self::execute_signed_request), but
    /// stops as soon as the matching `AbortHandle` is aborted.
    ///
    /// The in-flight dispatch is dropped and no retry is attempted.
    pub async fn execute_abortable(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        headers: HeaderMap,
        params: Params,
        registration: AbortRegistration,
    ) -> Result<Response, ClientError> {
        let request = self.execute_signed_request(method, path, body, headers, params);
        match Abortable::new(request, registration).await {
            Ok(result) => result,
            Err(Aborted) => {
                tracing::debug!(path, "request cancelled");
                Err(ClientError::Cancelled)
            }
        }
    }

    pub(crate) async fn execute_with_config(
        &self,
        config: &Config,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        headers: HeaderMap,
        params: Params,
    ) -> Result<Response, ClientError> {
        let endpoint = config.endpoint_url()?;
        let mut retries_left = SKEW_RETRIES;

        loop {
            let timestamp = corrected_now(self.clock.as_ref(), self.clock_offset.as_ref());
            let request = sign_request(
                config,
                &endpoint,
                &method,
                path,
                body.clone(),
                headers.clone(),
                &params,
                timestamp,
            )?;

            tracing::debug!(method = %method, path, "dispatching request");

            let error = match self.transport.dispatch(request).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            if retries_left > 0
                && let TransportError::Service(service_error) = &error
                && let Some(server_time) = config.skew().server_time(service_error)
            {
                let offset = (server_time - self.clock.now()).num_milliseconds();
                tracing::warn!(
                    offset_ms = offset,
                    code = ?service_error.code,
                    "clock skew detected, re-signing request"
                );
                self.clock_offset.set_offset(offset);
                retries_left -= 1;
                continue;
            }

            let error = ClientError::from(error);
            tracing::debug!(method = %method, path, %error, "request failed");
            return Err(error);
        }
    }
}

/// Stamp, sign and assemble a single request attempt.
#[allow(clippy::too_many_arguments)]
fn sign_request(
    config: &Config,
    endpoint: &Url,
    method: &Method,
    path: &str,
    body: Option<Bytes>,
    mut headers: HeaderMap,
    params: &Params,
    timestamp: DateTime<Utc>,
) -> Result<HttpRequest, ClientError> {
    headers.insert(X_BCE_DATE, header_value(&format_timestamp(timestamp))?);
    if !headers.contains_key(HOST) {
        headers.insert(HOST, header_value(&host_header(endpoint))?);
    }

    let token = Signer::new(config.credentials())
        .with_timestamp(timestamp)
        .with_expiration(config.expiration_seconds())
        .sign(method, path, params, &headers)?;
    headers.insert(AUTHORIZATION, header_value(&token.to_string())?);

    Ok(HttpRequest {
        endpoint: endpoint.clone(),
        method: method.clone(),
        path: path.to_string(),
        headers,
        params: params.clone(),
        body,
    })
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|error| {
        ClientError::Authorization(AuthorizationError::Signing(format!(
            "invalid header value: {}",
            error
        )))
    })
}

/// `host` or `host:port` when the port is not the scheme default.
fn host_header(endpoint: &Url) -> String {
    let host = endpoint.host_str().unwrap_or_default();
    match endpoint.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
