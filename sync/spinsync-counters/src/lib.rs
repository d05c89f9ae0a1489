//!
//! spinsync-counters - Increment Strategies
//!
//! A `Counter` exposes `increment()` and `get()` over one of three strategies,
//! chosen by `CounterKind` when the counter is built:
//!
//! - `CounterKind::Mutex` - `std::sync::Mutex<i64>`
//! - `CounterKind::CompareSwap` - load, compare-and-swap, back off on failure
//! - `CounterKind::FetchAdd` - one `fetch_add`
//!
//! ```
//! use spinsync_counters::{Counter, CounterKind};
//!
//! let counter = Counter::new("cas".parse::<CounterKind>().unwrap());
//! counter.increment();
//! counter.increment();
//! assert_eq!(counter.get(), 2);
//! ```
//!

pub mod counter;

pub use counter::*;
