//!
//! Data-Owning Lock Wrapper
//!
//! `Lock<L, T>` pairs any `RawLock` with the data it protects. The data is
//! only reachable through a `LockGuard`, and the guard returns its token to
//! the raw lock when dropped, including during unwinding. A worker thread
//! that panics inside the critical section therefore does not leave the lock
//! held.
//!

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use spinsync_core::{RawLock, RawTryLock};

pub struct Lock<L: RawLock, T: ?Sized> {
    raw: L,
    data: UnsafeCell<T>,
}

unsafe impl<L: RawLock, T: ?Sized + Send> Send for Lock<L, T> {}
unsafe impl<L: RawLock, T: ?Sized + Send> Sync for Lock<L, T> {}

impl<L: RawLock, T> Lock<L, T> {
    pub fn new(data: T) -> Self {
        Self::with_raw(L::default(), data)
    }

    /// Wraps `data` with an already configured raw lock, e.g. a
    /// `TtasLock::with_backoff`.
    pub fn with_raw(raw: L, data: T) -> Self {
        Self {
            raw,
            data: UnsafeCell::new(data),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<L: RawLock, T: ?Sized> Lock<L, T> {
    pub fn lock(&self) -> LockGuard<'_, L, T> {
        let token = self.raw.lock();
        LockGuard {
            lock: self,
            token: ManuallyDrop::new(token),
        }
    }

    /// Exclusive access through `&mut self` needs no locking.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn raw(&self) -> &L {
        &self.raw
    }
}

impl<L: RawTryLock, T: ?Sized> Lock<L, T> {
    pub fn try_lock(&self) -> Option<LockGuard<'_, L, T>> {
        self.raw.try_lock().map(|token| LockGuard {
            lock: self,
            token: ManuallyDrop::new(token),
        })
    }
}

impl<L: RawLock, T: Default> Default for Lock<L, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<L: RawLock + fmt::Debug, T: ?Sized> fmt::Debug for Lock<L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock").field("raw", &self.raw).finish_non_exhaustive()
    }
}

/// Scoped access to the data of a `Lock`.
pub struct LockGuard<'a, L: RawLock, T: ?Sized> {
    lock: &'a Lock<L, T>,
    token: ManuallyDrop<L::Token>,
}

unsafe impl<L: RawLock, T: ?Sized + Sync> Sync for LockGuard<'_, L, T> where L::Token: Sync {}

impl<L: RawLock, T: ?Sized> Deref for LockGuard<'_, L, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard holds the raw lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<L: RawLock, T: ?Sized> DerefMut for LockGuard<'_, L, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the raw lock, and `&mut self` is unique.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<L: RawLock, T: ?Sized> Drop for LockGuard<'_, L, T> {
    fn drop(&mut self) {
        // SAFETY: the token is taken exactly once, here, and came from this
        // lock's `lock` or `try_lock`.
        unsafe {
            let token = ManuallyDrop::take(&mut self.token);
            self.lock.raw.unlock(token);
        }
    }
}
