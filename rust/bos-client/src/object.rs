//! Object-level requests built on top of [`Client`].

use bce_auth::headers::{
    BCE_META_PREFIX, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_MD5, CONTENT_TYPE, ETAG, EXPIRES, X_BCE_ACL, X_BCE_CONTENT_SHA256,
    X_BCE_GRANT_FULL_CONTROL, X_BCE_GRANT_READ, X_BCE_OBJECT_ACL, X_BCE_OBJECT_GRANT_READ,
    X_BCE_SECURITY_TOKEN,
};
use bce_auth::{Params, byte_size, normalize_path, uri_encode};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};

use crate::client::Client;
use crate::config::Config;
use crate::error::{ClientError, ValidationError};
use crate::response::Response;
use crate::transport::Transport;

/// Largest object accepted by a single `PUT`: 5 GiB.
pub const MAX_PUT_OBJECT_LENGTH: u64 = 5_368_709_120;

/// Largest total size of `x-bce-meta-*` names and values, in bytes.
pub const MAX_USER_METADATA_SIZE: usize = 2048;

/// `content-type` sent when the caller gives none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Headers a caller may set on an object upload, besides `x-bce-meta-*`.
pub const ALLOWED_HEADERS: [&str; 15] = [
    CONTENT_LENGTH,
    CONTENT_ENCODING,
    CONTENT_MD5,
    X_BCE_CONTENT_SHA256,
    CONTENT_TYPE,
    CONTENT_DISPOSITION,
    ETAG,
    X_BCE_SECURITY_TOKEN,
    CACHE_CONTROL,
    EXPIRES,
    X_BCE_ACL,
    X_BCE_GRANT_READ,
    X_BCE_GRANT_FULL_CONTROL,
    X_BCE_OBJECT_ACL,
    X_BCE_OBJECT_GRANT_READ,
];

/// Arguments of a bucket or object request.
#[derive(Debug, Clone, Default)]
pub struct RequestArgs {
    /// Target bucket
    pub bucket: Option<String>,
    /// Target object key
    pub key: Option<String>,
    /// Request body
    pub body: Option<Bytes>,
    /// Request headers
    pub headers: HeaderMap,
    /// Query parameters
    pub params: Params,
    /// Replaces the client configuration for this request only
    pub config: Option<Config>,
}

impl RequestArgs {
    /// Arguments addressing `bucket`.
    pub fn bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            ..Self::default()
        }
    }

    /// Address `key` within the bucket.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Send `body`.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Send `headers`.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a query parameter; `None` sends a bare key.
    pub fn with_param(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Use `config` instead of the client's configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }
}

/// Caller-provided options of an object upload.
#[derive(Debug, Clone, Default)]
pub struct PutObjectOptions {
    /// Upload headers; anything outside [`ALLOWED_HEADERS`] and
    /// `x-bce-meta-*` is dropped
    pub headers: HeaderMap,
    /// Replaces the client configuration for this upload only
    pub config: Option<Config>,
}

impl PutObjectOptions {
    /// Send `headers` with the upload.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Use `config` instead of the client's configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }
}

impl<T: Transport> Client<T> {
    /// The unsigned URL of an object.
    ///
    /// ```
    /// use bce_auth::Credentials;
    /// use bos_client::{Client, Config};
    ///
    /// let config = Config::new("https://bj.bcebos.com", Credentials::new("ak", "sk"));
    /// let client = Client::new(config).unwrap();
    ///
    /// assert_eq!(
    ///     client.generate_url("bucket", "photos/a b.jpg"),
    ///     "https://bj.bcebos.com/v1/bucket/photos/a%20b.jpg"
    /// );
    /// ```
    pub fn generate_url(&self, bucket: &str, key: &str) -> String {
        let resource = normalize_path(&format!(
            "/v1/{}/{}",
            uri_encode(bucket, true),
            uri_encode(key, false)
        ));
        format!("{}{}", self.config().endpoint().trim_end_matches('/'), resource)
    }

    /// Upload `data` as `bucket/key`.
    ///
    /// Headers are validated before anything is sent.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        options: PutObjectOptions,
    ) -> Result<Response, ClientError> {
        if key.is_empty() {
            return Err(ValidationError::EmptyKey.into());
        }

        let headers = prepare_object_headers(&options.headers)?;

        let mut args = RequestArgs::bucket(bucket)
            .with_key(key)
            .with_body(data)
            .with_headers(headers);
        args.config = options.config;

        self.send_request(Method::PUT, args).await
    }

    /// Upload `data` as `bucket/key`, declaring its length up front.
    pub async fn put_object_from_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        mut options: PutObjectOptions,
    ) -> Result<Response, ClientError> {
        let data = data.into();
        if !options.headers.contains_key(CONTENT_LENGTH) {
            options
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(data.len() as u64));
        }

        self.put_object(bucket, key, data, options).await
    }

    /// Sign and send a request addressed by bucket and key.
    ///
    /// The bucket is left out of the path when the endpoint is already
    /// bucket-scoped (`{bucket}.{region}.bcebos.com`). A configured session
    /// token is sent as `x-bce-security-token`.
    pub async fn send_request(
        &self,
        method: Method,
        args: RequestArgs,
    ) -> Result<Response, ClientError> {
        let RequestArgs {
            bucket,
            key,
            body,
            mut headers,
            params,
            config,
        } = args;
        let config = config.as_ref().unwrap_or(self.config());

        let endpoint = config.endpoint_url()?;
        let bucket = match endpoint.host_str() {
            Some(host) if is_bucket_endpoint(host) => String::new(),
            _ => uri_encode(bucket.as_deref().unwrap_or_default(), true),
        };
        let resource = normalize_path(&format!(
            "/v1/{}/{}",
            bucket,
            uri_encode(key.as_deref().unwrap_or_default(), false)
        ));

        if let Some(token) = config.session_token() {
            let token = HeaderValue::from_str(token)
                .map_err(|_| ValidationError::InvalidHeader(X_BCE_SECURITY_TOKEN.to_string()))?;
            headers.insert(X_BCE_SECURITY_TOKEN, token);
        }

        self.execute_with_config(config, method, &resource, body, headers, params)
            .await
    }
}

/// Whether `host` already names a bucket, as in `bucket.bj.bcebos.com`.
pub fn is_bucket_endpoint(host: &str) -> bool {
    let Some(prefix) = host.strip_suffix(".bcebos.com") else {
        return false;
    };
    match prefix.rsplit_once('.') {
        Some((_, region)) => {
            !region.is_empty()
                && region
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

/// Validate and complete the headers of an object upload.
///
/// Drops headers that are neither allowed nor user metadata, enforces the
/// metadata and object size limits, quotes `etag` and defaults
/// `content-type`.
pub fn prepare_object_headers(headers: &HeaderMap) -> Result<HeaderMap, ValidationError> {
    let mut prepared = HeaderMap::new();
    let mut metadata_size = 0;

    for (name, value) in headers {
        let is_metadata = name.as_str().starts_with(BCE_META_PREFIX);
        if !is_metadata && !ALLOWED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if prepared.contains_key(name) {
            continue;
        }

        if is_metadata {
            metadata_size += byte_size(name.as_str()) + value.as_bytes().len();
        }
        prepared.insert(name.clone(), value.clone());
    }

    if metadata_size > MAX_USER_METADATA_SIZE {
        return Err(ValidationError::MetadataTooLarge {
            size: metadata_size,
            limit: MAX_USER_METADATA_SIZE,
        });
    }

    if let Some(value) = prepared.get(CONTENT_LENGTH) {
        let text = value
            .to_str()
            .map_err(|_| ValidationError::InvalidHeader(CONTENT_LENGTH.to_string()))?
            .trim();
        let length: i64 = text
            .parse()
            .map_err(|_| ValidationError::InvalidContentLength(text.to_string()))?;
        if length < 0 {
            return Err(ValidationError::NegativeContentLength);
        }
        if length as u64 > MAX_PUT_OBJECT_LENGTH {
            return Err(ValidationError::ObjectTooLarge {
                length: length as u64,
                limit: MAX_PUT_OBJECT_LENGTH,
            });
        }
    }

    if let Some(value) = prepared.get(ETAG)
        && !value.as_bytes().starts_with(b"\"")
    {
        let text = value
            .to_str()
            .map_err(|_| ValidationError::InvalidHeader(ETAG.to_string()))?;
        let quoted = HeaderValue::from_str(&format!("\"{}\"", text))
            .map_err(|_| ValidationError::InvalidHeader(ETAG.to_string()))?;
        prepared.insert(ETAG, quoted);
    }

    if !prepared.contains_key(CONTENT_TYPE) {
        prepared.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    }

    Ok(prepared)
}
