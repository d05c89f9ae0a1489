//!
//! Test-and-Test-and-Set Lock
//!
//! Waiters first poll the flag with relaxed loads, which stay in the local
//! cache while the holder keeps the line unmodified. Only when the flag reads
//! free does a waiter issue the acquire-ordered exchange. Losing that race
//! sends it back to polling.
//!
//! With a `Backoff` configured, every lost exchange also sleeps for an
//! exponentially growing delay before polling again. The attempt counter is
//! local to one `acquire` call.
//!

use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};

use spinsync_core::{Backoff, RawLock, RawTryLock};
use tracing::debug;

#[derive(Debug, Default)]
pub struct TtasLock {
    locked: AtomicBool,
    backoff: Option<Backoff>,
}

impl TtasLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            backoff: None,
        }
    }

    pub fn with_backoff(backoff: Backoff) -> Self {
        debug!(start = ?backoff.start(), cap = ?backoff.cap(), "ttas lock with backoff");
        Self {
            locked: AtomicBool::new(false),
            backoff: Some(backoff),
        }
    }

    pub fn backoff(&self) -> Option<Backoff> {
        self.backoff
    }

    pub fn acquire(&self) {
        let mut attempt = 0;
        loop {
            while self.locked.load(Ordering::Relaxed) {
                hint::spin_loop();
            }

            if !self.locked.swap(true, Ordering::Acquire) {
                return;
            }

            if let Some(backoff) = &self.backoff {
                backoff.snooze(&mut attempt);
            }
        }
    }

    /// One test, then at most one exchange. Never waits.
    pub fn try_acquire(&self) -> bool {
        !self.locked.load(Ordering::Relaxed) && !self.locked.swap(true, Ordering::Acquire)
    }

    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl RawLock for TtasLock {
    type Token = ();

    fn lock(&self) {
        self.acquire();
    }

    unsafe fn unlock(&self, _token: ()) {
        self.release();
    }
}

impl RawTryLock for TtasLock {
    fn try_lock(&self) -> Option<()> {
        self.try_acquire().then_some(())
    }
}
