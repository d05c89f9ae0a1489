//!
//! Barrier Benchmark
//!
//! Every worker goes through `phases` barrier waits, first on the
//! sense-reversing barrier and then on `std::sync::Barrier` for comparison.
//! Before each wait a worker records its arrival; after the wait it checks
//! that every arrival of the phase is already visible. A run only counts if
//! all `threads * phases` checks held.
//!

use std::fmt::Write as _;
use std::sync::Barrier;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use spinsync_barrier::{LocalSense, SenseBarrier};
use spinsync_core::Backoff;
use tracing::{debug, info};

use crate::config::BarrierBenchConfig;
use crate::errors::BenchError;
use crate::gate::run_workers;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarrierReport {
    pub threads: usize,
    pub phases: usize,
    pub sense_reversing_secs: f64,
    pub std_secs: f64,
}

impl BarrierReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>20}{:>15}", "Barrier", "Seconds");
        let _ = writeln!(out, "{:>20}{:>15.3}", "sense-reversing", self.sense_reversing_secs);
        let _ = writeln!(out, "{:>20}{:>15.3}", "std", self.std_secs);
        out
    }
}

/// Arrival bookkeeping shared by one timed run.
struct PhaseCheck {
    arrivals: AtomicU64,
    confirmed: AtomicU64,
}

impl PhaseCheck {
    fn new() -> Self {
        Self {
            arrivals: AtomicU64::new(0),
            confirmed: AtomicU64::new(0),
        }
    }

    fn arrive(&self) {
        self.arrivals.fetch_add(1, Ordering::Relaxed);
    }

    /// Called after the wait of `phase`, zero-based.
    fn depart(&self, phase: usize, threads: usize) {
        let required = (threads * (phase + 1)) as u64;
        if self.arrivals.load(Ordering::Relaxed) >= required {
            self.confirmed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn finish(self, primitive: &str, threads: usize, phases: usize) -> Result<(), BenchError> {
        let expected = (threads * phases) as u64;
        let actual = self.confirmed.into_inner();
        if actual != expected {
            return Err(BenchError::CorrectnessFailed {
                primitive: primitive.to_string(),
                threads,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

fn drive_sense(
    barrier: &SenseBarrier,
    config: &BarrierBenchConfig,
    check: &PhaseCheck,
) -> Duration {
    run_workers(config.threads, |_| {
        let mut local = LocalSense::new();
        for phase in 0..config.phases {
            check.arrive();
            barrier.wait(&mut local);
            check.depart(phase, config.threads);
        }
    })
}

fn drive_std(barrier: &Barrier, config: &BarrierBenchConfig, check: &PhaseCheck) -> Duration {
    run_workers(config.threads, |_| {
        for phase in 0..config.phases {
            check.arrive();
            barrier.wait();
            check.depart(phase, config.threads);
        }
    })
}

pub fn run(config: &BarrierBenchConfig, backoff: Backoff) -> Result<BarrierReport, BenchError> {
    // Rejects zero threads before any worker is spawned.
    let barrier = SenseBarrier::with_backoff(config.threads, backoff)?;
    info!(threads = config.threads, phases = config.phases, "benchmarking barriers");

    let check = PhaseCheck::new();
    let sense_elapsed = drive_sense(&barrier, config, &check);
    check.finish("sense-reversing barrier", config.threads, config.phases)?;
    debug!(secs = sense_elapsed.as_secs_f64(), "sense-reversing barrier complete");

    let check = PhaseCheck::new();
    let std_elapsed = drive_std(&Barrier::new(config.threads), config, &check);
    check.finish("std barrier", config.threads, config.phases)?;
    debug!(secs = std_elapsed.as_secs_f64(), "std barrier complete");

    Ok(BarrierReport {
        threads: config.threads,
        phases: config.phases,
        sense_reversing_secs: sense_elapsed.as_secs_f64(),
        std_secs: std_elapsed.as_secs_f64(),
    })
}
