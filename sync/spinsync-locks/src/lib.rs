//!
//! spinsync-locks - Spin-Based Mutual Exclusion
//!
//! ## Flag Locks
//!
//! One shared atomic boolean, `false` meaning free:
//! - `TasLock` - every attempt is an acquire-ordered exchange
//! - `TtasLock` - relaxed read-only polling until the flag looks free, then the exchange
//!
//! Both have a `with_backoff` constructor that sleeps through a `Backoff` after
//! each lost exchange.
//!
//! ## Queue Lock
//!
//! `McsLock` queues waiters in arrival order. Each waiter supplies an `McsNode`
//! and spins only on that node's own flag, so a release touches exactly one
//! remote cache line. The node is the worker's explicit per-acquisition context
//! and can be reused once its acquisition has been released. `McsLock::with_node`
//! runs a critical section as a closure and releases before returning.
//!
//! ## Guarded Data
//!
//! `Lock<L, T>` owns a `T` and hands out `LockGuard`s for any `L: RawLock`:
//!
//! ```
//! use spinsync_locks::{Lock, McsLock, TasLock};
//!
//! let counter: Lock<McsLock, u64> = Lock::new(0);
//! *counter.lock() += 1;
//!
//! let flags: Lock<TasLock, Vec<bool>> = Lock::new(Vec::new());
//! flags.lock().push(true);
//!
//! assert_eq!(*counter.lock(), 1);
//! assert_eq!(flags.into_inner(), vec![true]);
//! ```
//!

pub mod guarded;
pub mod mcs;
pub mod tas;
pub mod ttas;

pub use guarded::*;
pub use mcs::*;
pub use tas::*;
pub use ttas::*;

pub use spinsync_core::{RawLock, RawTryLock};
