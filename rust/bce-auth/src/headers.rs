//! Well-known header names, lower-cased.
#![allow(missing_docs)]

pub const AUTHORIZATION: &str = "authorization";
pub const HOST: &str = "host";
pub const DATE: &str = "date";
pub const ETAG: &str = "etag";
pub const EXPIRES: &str = "expires";
pub const CACHE_CONTROL: &str = "cache-control";
pub const CONTENT_DISPOSITION: &str = "content-disposition";
pub const CONTENT_ENCODING: &str = "content-encoding";
pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_MD5: &str = "content-md5";
pub const CONTENT_TYPE: &str = "content-type";

/// Prefix of headers that are always signed.
pub const BCE_PREFIX: &str = "x-bce-";
/// Prefix of user metadata headers.
pub const BCE_META_PREFIX: &str = "x-bce-meta-";

pub const X_BCE_DATE: &str = "x-bce-date";
pub const X_BCE_REQUEST_ID: &str = "x-bce-request-id";
pub const X_BCE_CONTENT_SHA256: &str = "x-bce-content-sha256";
pub const X_BCE_SECURITY_TOKEN: &str = "x-bce-security-token";
pub const X_BCE_ACL: &str = "x-bce-acl";
pub const X_BCE_GRANT_READ: &str = "x-bce-grant-read";
pub const X_BCE_GRANT_FULL_CONTROL: &str = "x-bce-grant-full-control";
pub const X_BCE_OBJECT_ACL: &str = "x-bce-object-acl";
pub const X_BCE_OBJECT_GRANT_READ: &str = "x-bce-object-grant-read";
