//!
//! spinsync-core - Shared Primitive Building Blocks
//!
//! This crate provides the types shared across all spinsync primitive crates:
//!
//! - `Backoff` for sleep-based exponential backoff (start, doubling, fixed cap)
//! - `RawLock` and `RawTryLock`, the acquire/release seam implemented by every lock
//! - `SyncError` for the configuration errors detected at construction
//!
//! Nothing here spins or blocks on its own except `Backoff::snooze`.
//!

pub mod backoff;
pub mod error;
pub mod raw;

pub use backoff::*;
pub use error::*;
pub use raw::*;
