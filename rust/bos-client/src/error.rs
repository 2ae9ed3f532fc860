//! Error types for request execution.

use bce_auth::AuthorizationError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A request the service answered with a failure status.
///
/// Decoded once at the transport boundary from the response status, the
/// JSON error body and the `date` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code
    pub status: u16,
    /// Service error code, e.g. `RequestTimeTooSkewed`
    pub code: Option<String>,
    /// Human-readable message
    pub message: Option<String>,
    /// Request tracking identifier
    pub request_id: Option<String>,
    /// Server clock at the time of the response
    pub date: Option<DateTime<Utc>>,
}

impl ServiceError {
    /// Create an error carrying only a status code.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            code: None,
            message: None,
            request_id: None,
            date: None,
        }
    }

    /// Set the service error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the request id.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set the server date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Fill in a generic message if the service did not provide one.
    pub fn normalized(mut self) -> Self {
        if self.message.is_none() {
            self.message = Some(format!("Unknown error. ({})", self.status));
        }
        self
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message)?,
            None => write!(f, "Unknown error. ({})", self.status)?,
        }
        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// Failures reported by a [`Transport`](crate::Transport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The service answered with an error status.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The connection to the service could not be established.
    #[error("failed to connect: {0}")]
    ConnectionFailed(String),

    /// The request failed without a usable response.
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if error.is_connect() {
                TransportError::ConnectionFailed(error.to_string())
            } else {
                TransportError::RequestFailed(error.to_string())
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            // WASM doesn't have is_connect()
            TransportError::RequestFailed(error.to_string())
        }
    }
}

/// Input rejected by the request builder before anything is dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The object key is empty.
    #[error("key should not be empty")]
    EmptyKey,

    /// User metadata exceeds the service limit.
    #[error("metadata size should not be greater than {limit} (got {size})")]
    MetadataTooLarge {
        /// Total metadata size in bytes
        size: usize,
        /// Maximum allowed size in bytes
        limit: usize,
    },

    /// `content-length` is negative.
    #[error("content_length should not be negative")]
    NegativeContentLength,

    /// `content-length` exceeds the single-request upload limit.
    #[error("object length should be less than {limit}, use multi-part upload instead")]
    ObjectTooLarge {
        /// Declared object length
        length: u64,
        /// Maximum allowed length
        limit: u64,
    },

    /// `content-length` is not an integer.
    #[error("invalid content_length: {0}")]
    InvalidContentLength(String),

    /// A header name or value cannot be used.
    #[error("invalid header `{0}`")]
    InvalidHeader(String),
}

/// Errors surfaced to callers of [`Client`](crate::Client).
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be signed.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The request was rejected before dispatch.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service rejected the request.
    #[error(transparent)]
    Service(ServiceError),

    /// The transport failed without a service response.
    #[error(transparent)]
    Transport(TransportError),

    /// The caller aborted the request.
    #[error("request was cancelled")]
    Cancelled,

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Service(error) => ClientError::Service(error.normalized()),
            error => ClientError::Transport(error),
        }
    }
}
