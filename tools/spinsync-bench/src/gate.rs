//!
//! Simultaneous Start
//!
//! Workers spin on a start flag, yielding between acquire-ordered loads,
//! until the driver opens it with a release store. Timing starts when the
//! gate opens and ends once every worker has been joined.
//!

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct StartGate {
    open: AtomicBool,
}

impl StartGate {
    pub const fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
        }
    }

    pub fn wait(&self) {
        while !self.open.load(Ordering::Acquire) {
            thread::yield_now();
        }
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Runs `worker(id)` on `threads` scoped threads released together and
/// returns the wall-clock time from release to the last join.
pub fn run_workers<F>(threads: usize, worker: F) -> Duration
where
    F: Fn(usize) + Sync,
{
    let gate = StartGate::new();
    let worker = &worker;
    let gate_ref = &gate;

    let started = thread::scope(|s| {
        for id in 0..threads {
            s.spawn(move || {
                gate_ref.wait();
                worker(id);
            });
        }
        let started = Instant::now();
        gate.open();
        started
    });
    started.elapsed()
}
