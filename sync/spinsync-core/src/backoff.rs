//!
//! Exponential Backoff
//!
//! One pure function maps a failed-attempt count to a sleep duration:
//! the delay starts at `start`, doubles on every attempt and never exceeds
//! `cap`. The TTAS backoff lock, the sense-reversing barrier and the
//! compare-and-swap counter all sleep through this type.
//!
//! ```
//! use std::time::Duration;
//! use spinsync_core::Backoff;
//!
//! let backoff = Backoff::DEFAULT;
//! assert_eq!(backoff.delay(0), Duration::from_micros(1));
//! assert_eq!(backoff.delay(3), Duration::from_micros(8));
//! assert_eq!(backoff.delay(40), Duration::from_micros(1000));
//! ```
//!

use std::thread;
use std::time::Duration;

use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    start: Duration,
    cap: Duration,
}

impl Backoff {
    /// 1µs doubling up to 1ms.
    pub const DEFAULT: Backoff = Backoff {
        start: Duration::from_micros(1),
        cap: Duration::from_micros(1000),
    };

    pub fn new(start: Duration, cap: Duration) -> Result<Self, SyncError> {
        if start.is_zero() || start > cap {
            return Err(SyncError::InvalidBackoff { start, cap });
        }
        Ok(Self { start, cap })
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Delay to sleep after `attempt` previous failures.
    ///
    /// `attempt = 0` yields `start`. The doubling saturates, so any attempt
    /// count is accepted and the result is always within `start..=cap`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.start.saturating_mul(factor).min(self.cap)
    }

    /// Sleeps for `delay(*attempt)` and advances the attempt counter.
    pub fn snooze(&self, attempt: &mut u32) {
        thread::sleep(self.delay(*attempt));
        *attempt = attempt.saturating_add(1);
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::DEFAULT
    }
}
