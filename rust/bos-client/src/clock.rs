//! Time sources and clock-skew correction.
//!
//! Signatures embed a timestamp that the server checks against its own
//! clock. When a server rejects a request as skewed, the difference between
//! its clock and ours is stored in a [`ClockCorrection`] and added to every
//! later signing timestamp.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

use crate::sync::ConditionalSync;

#[cfg(not(target_arch = "wasm32"))]
use std::time::SystemTime;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, web::SystemTimeExt};

/// A source of the current time.
pub trait Clock: ConditionalSync {
    /// The current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
///
/// Uses `std::time::SystemTime` on native and `web_time` on wasm.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(SystemTime::now())
    }

    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(SystemTime::now().to_std())
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Storage for the local-to-server clock offset, in milliseconds.
pub trait ClockCorrection: ConditionalSync {
    /// The current offset. Positive means the server is ahead of us.
    fn offset(&self) -> i64;

    /// Replace the offset.
    fn set_offset(&self, offset: i64);
}

/// Lock-free [`ClockCorrection`] shared between clients via `Arc`.
///
/// Starts at zero and is overwritten on every observed skew; concurrent
/// writers race and the last one wins.
#[derive(Debug, Default)]
pub struct ClockOffset(AtomicI64);

impl ClockOffset {
    /// Create an offset of zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockCorrection for ClockOffset {
    fn offset(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    fn set_offset(&self, offset: i64) {
        self.0.store(offset, Ordering::Relaxed);
    }
}

/// The clock's time shifted by the stored offset.
pub fn corrected_now(clock: &dyn Clock, correction: &dyn ClockCorrection) -> DateTime<Utc> {
    clock.now() + Duration::milliseconds(correction.offset())
}
