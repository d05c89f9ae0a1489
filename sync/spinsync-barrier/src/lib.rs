//!
//! spinsync-barrier - Sense-Reversing Barrier
//!
//! A barrier for a fixed number of participants that can be reused for any
//! number of phases without reconstruction. Each phase completes when the
//! last participant arrives; that participant resets the arrival count and
//! flips the shared sense, which releases everyone polling it.
//!
//! The phase parity each worker expects is not thread-local: it lives in a
//! `LocalSense` the worker owns and passes to every `wait`, or inside a
//! `Participant` handle.
//!
//! ```
//! use std::thread;
//! use spinsync_barrier::SenseBarrier;
//!
//! let barrier = SenseBarrier::new(3).unwrap();
//! thread::scope(|s| {
//!     for _ in 0..3 {
//!         s.spawn(|| {
//!             let mut me = barrier.participant();
//!             for _ in 0..10 {
//!                 me.wait();
//!             }
//!         });
//!     }
//! });
//! ```
//!
//! Fewer than `parties()` arrivals in a phase stall that phase forever. There
//! is no timeout.
//!

pub mod sense;

pub use sense::*;

pub use spinsync_core::{Backoff, SyncError};
