#![warn(missing_docs)]

//! Signed request execution for Baidu Object Storage.
//!
//! A [`Client`] stamps every request with the current time, signs it with
//! [`bce_auth`], and dispatches it through a [`Transport`]. When the service
//! rejects a request because the local clock is off, the client learns the
//! offset from the server's `date` header and re-signs the request once.
//!
//! ```no_run
//! use bos_client::{Client, Config, PutObjectOptions};
//!
//! # async fn example() -> Result<(), bos_client::ClientError> {
//! let client = Client::new(Config::from_env()?)?;
//!
//! let response = client
//!     .put_object_from_bytes("bucket", "hello.txt", "hello", PutObjectOptions::default())
//!     .await?;
//! println!("uploaded, etag {:?}", response.header("etag"));
//! # Ok(())
//! # }
//! ```

mod sync;
pub use sync::*;

pub mod clock;
pub mod config;
pub mod error;
pub mod object;
pub mod response;
pub mod skew;
pub mod transport;

mod client;
pub use client::*;

pub use clock::{Clock, ClockCorrection, ClockOffset, FixedClock, SystemClock, corrected_now};
pub use config::Config;
pub use error::{ClientError, ServiceError, TransportError, ValidationError};
pub use object::{PutObjectOptions, RequestArgs};
pub use response::{Body, Response};
pub use skew::SkewPolicy;
pub use transport::{HttpRequest, ReqwestTransport, Transport};
