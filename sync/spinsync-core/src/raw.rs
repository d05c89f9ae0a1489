//!
//! Raw Lock Seam
//!
//! A raw lock only provides mutual exclusion; it owns no data. Acquiring
//! hands back a `Token` that must be returned on release. Flag locks use
//! `()`; queue locks carry their queue node in the token so that the node
//! keeps a stable address for the whole acquisition.
//!
//! Data-owning wrappers are generic over this trait so every lock algorithm
//! can guard the same `T`.
//!

pub trait RawLock: Default + Send + Sync {
    /// Proof of ownership handed from `lock` to `unlock`.
    type Token;

    /// Blocks the calling thread until the lock is held.
    fn lock(&self) -> Self::Token;

    /// Releases the lock.
    ///
    /// # Safety
    ///
    /// `token` must come from a `lock` (or successful `try_lock`) call on
    /// this same instance whose critical section has not been released yet.
    unsafe fn unlock(&self, token: Self::Token);
}

pub trait RawTryLock: RawLock {
    /// Acquires the lock only if that can be done without waiting.
    fn try_lock(&self) -> Option<Self::Token>;
}
