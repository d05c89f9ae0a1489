//!
//! Test-and-Set Lock
//!
//! The naive exchange lock. Every failed attempt is a write, so under
//! contention each waiter keeps invalidating the flag's cache line in every
//! other core. That traffic is what this lock exists to show next to
//! `TtasLock` and `McsLock`.
//!
//! `TasLock::with_backoff` sleeps through a `Backoff` after each failed
//! exchange instead of retrying at once.
//!

use std::sync::atomic::{AtomicBool, Ordering};

use spinsync_core::{Backoff, RawLock, RawTryLock};
use tracing::debug;

#[derive(Debug, Default)]
pub struct TasLock {
    locked: AtomicBool,
    backoff: Option<Backoff>,
}

impl TasLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            backoff: None,
        }
    }

    pub fn with_backoff(backoff: Backoff) -> Self {
        debug!(start = ?backoff.start(), cap = ?backoff.cap(), "tas lock with backoff");
        Self {
            locked: AtomicBool::new(false),
            backoff: Some(backoff),
        }
    }

    pub fn backoff(&self) -> Option<Backoff> {
        self.backoff
    }

    /// Spins on the exchange until it observes the flag free.
    pub fn acquire(&self) {
        let mut attempt = 0;
        while self.locked.swap(true, Ordering::Acquire) {
            if let Some(backoff) = &self.backoff {
                backoff.snooze(&mut attempt);
            }
        }
    }

    /// Single exchange attempt.
    pub fn try_acquire(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    /// Releasing a lock the caller does not hold breaks mutual exclusion
    /// for whoever does hold it. It is not detected.
    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl RawLock for TasLock {
    type Token = ();

    fn lock(&self) {
        self.acquire();
    }

    unsafe fn unlock(&self, _token: ()) {
        self.release();
    }
}

impl RawTryLock for TasLock {
    fn try_lock(&self) -> Option<()> {
        self.try_acquire().then_some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::UnsafeCell;
    use std::thread;
    use std::time::Duration;

    struct Shared(UnsafeCell<u64>);

    unsafe impl Sync for Shared {}

    impl Shared {
        /// # Safety
        ///
        /// Caller holds the lock guarding this counter.
        unsafe fn bump(&self) {
            unsafe { *self.0.get() += 1 };
        }
    }

    fn hammer(lock: &TasLock, threads: usize, iterations: u64) -> u64 {
        let counter = Shared(UnsafeCell::new(0));
        thread::scope(|s| {
            for _ in 0..threads {
                s.spawn(|| {
                    for _ in 0..iterations {
                        lock.acquire();
                        unsafe { counter.bump() };
                        lock.release();
                    }
                });
            }
        });
        counter.0.into_inner()
    }

    #[test]
    fn test_acquire_release() {
        let lock = TasLock::new();
        assert!(!lock.is_locked());
        lock.acquire();
        assert!(lock.is_locked());
        lock.release();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_try_acquire_while_held() {
        let lock = TasLock::new();
        assert!(lock.try_acquire());
        assert!(!lock.try_acquire());
        lock.release();
        assert!(lock.try_acquire());
        lock.release();
    }

    #[test]
    fn test_double_release_leaves_lock_free() {
        let lock = TasLock::new();
        lock.acquire();
        lock.release();
        lock.release();
        assert!(!lock.is_locked());
        assert!(lock.try_acquire());
        assert!(!lock.try_acquire());
        lock.release();
    }

    #[test]
    fn test_default_has_no_backoff() {
        assert!(TasLock::default().backoff().is_none());
        assert!(TasLock::new().backoff().is_none());
        assert_eq!(
            TasLock::with_backoff(Backoff::DEFAULT).backoff(),
            Some(Backoff::DEFAULT)
        );
    }

    #[test]
    fn test_tas_concurrent() {
        assert_eq!(hammer(&TasLock::new(), 4, 10_000), 40_000);
    }

    #[test]
    fn test_tas_backoff_concurrent() {
        let backoff = Backoff::new(Duration::from_micros(1), Duration::from_micros(50)).unwrap();
        assert_eq!(hammer(&TasLock::with_backoff(backoff), 4, 5_000), 20_000);
    }

    #[test]
    fn test_backoff_waiter_enters_after_release() {
        let lock = TasLock::with_backoff(Backoff::DEFAULT);
        let entered = AtomicBool::new(false);
        lock.acquire();

        thread::scope(|s| {
            s.spawn(|| {
                lock.acquire();
                entered.store(true, Ordering::SeqCst);
                lock.release();
            });

            thread::sleep(Duration::from_millis(20));
            assert!(!entered.load(Ordering::SeqCst));
            lock.release();
        });

        assert!(entered.load(Ordering::SeqCst));
        assert!(!lock.is_locked());
    }
}
