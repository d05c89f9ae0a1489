///
/// # Strategy Tests for spinsync-counters
///
/// Every strategy must count exactly under contention. Workers start together
/// behind a release-ordered start flag, as the benchmark harness does.
///

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use spinsync_core::Backoff;
use spinsync_counters::{Counter, CounterKind};

fn hammer(counter: &Counter, threads: usize, operations: usize) {
    let start = AtomicBool::new(false);
    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                while !start.load(Ordering::Acquire) {
                    thread::yield_now();
                }
                for _ in 0..operations {
                    counter.increment();
                }
            });
        }
        start.store(true, Ordering::Release);
    });
}

#[test]
fn test_every_strategy_counts_exactly() {
    for kind in CounterKind::ALL {
        for threads in [1, 2, 4, 8] {
            let counter = Counter::new(kind);
            hammer(&counter, threads, 20_000);
            let expected = (threads * 20_000) as i64;
            assert_eq!(counter.get(), expected, "{} with {} threads", kind, threads);
        }
    }
}

#[test]
fn test_compare_swap_with_short_backoff() {
    let backoff = Backoff::new(Duration::from_micros(1), Duration::from_micros(8)).unwrap();
    let counter = Counter::with_backoff(CounterKind::CompareSwap, backoff);
    hammer(&counter, 8, 20_000);
    assert_eq!(counter.get(), 160_000);
}
