//!
//! Lock Benchmark
//!
//! For every configured thread count and lock kind, each worker runs
//! `iterations` critical sections: acquire, one primality test, increment a
//! plain shared counter, release, then `outside_work` primality tests without
//! the lock. The counter is checked against `threads * iterations` after the
//! join, so a broken lock fails the run instead of just reporting a time.
//!

use std::cell::UnsafeCell;
use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use spinsync_core::{Backoff, RawLock};
use spinsync_locks::{McsLock, McsNode, TasLock, TtasLock};
use tracing::{debug, info};

use crate::config::LockBenchConfig;
use crate::errors::BenchError;
use crate::gate::run_workers;
use crate::work::is_prime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LockKind {
    Tas,
    TasBackoff,
    Ttas,
    TtasBackoff,
    Mcs,
    StdMutex,
}

impl LockKind {
    pub const ALL: [LockKind; 6] = [
        LockKind::Tas,
        LockKind::TasBackoff,
        LockKind::Ttas,
        LockKind::TtasBackoff,
        LockKind::Mcs,
        LockKind::StdMutex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LockKind::Tas => "tas",
            LockKind::TasBackoff => "tas-backoff",
            LockKind::Ttas => "ttas",
            LockKind::TtasBackoff => "ttas-backoff",
            LockKind::Mcs => "mcs",
            LockKind::StdMutex => "std-mutex",
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LockKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LockKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BenchError::InvalidConfig(format!("unknown lock kind '{}'", s)))
    }
}

/// Shared counter with no synchronization of its own.
struct PlainCounter(UnsafeCell<u64>);

unsafe impl Sync for PlainCounter {}

impl PlainCounter {
    fn new() -> Self {
        Self(UnsafeCell::new(0))
    }

    /// # Safety
    ///
    /// Only called while the lock under test is held.
    unsafe fn bump(&self) {
        unsafe { *self.0.get() += 1 };
    }

    fn into_inner(self) -> u64 {
        self.0.into_inner()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockSample {
    pub kind: LockKind,
    pub threads: usize,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockRow {
    pub threads: usize,
    pub millis: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockReport {
    pub iterations: usize,
    pub kinds: Vec<LockKind>,
    pub rows: Vec<LockRow>,
}

impl LockReport {
    /// Fixed-width table, one row per thread count, milliseconds per lock.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{:>10}", "Threads");
        for kind in &self.kinds {
            let _ = write!(out, "{:>15}", kind.name());
        }
        out.push('\n');
        for row in &self.rows {
            let _ = write!(out, "{:>10}", row.threads);
            for ms in &row.millis {
                let _ = write!(out, "{:>15.2}", ms);
            }
            out.push('\n');
        }
        out
    }
}

/// Hands the critical-section body to `with_lock` `iterations` times, with
/// the outside work in between.
fn iterate(
    config: &LockBenchConfig,
    counter: &PlainCounter,
    mut with_lock: impl FnMut(&mut dyn FnMut()),
) {
    let mut body = || {
        is_prime(config.critical_work);
        // SAFETY: `with_lock` runs the body only while holding the lock.
        unsafe { counter.bump() };
    };
    for _ in 0..config.iterations {
        with_lock(&mut body);
        for _ in 0..config.outside_work {
            is_prime(config.critical_work);
        }
    }
}

fn drive_raw<L: RawLock>(
    lock: &L,
    threads: usize,
    config: &LockBenchConfig,
    counter: &PlainCounter,
) -> Duration {
    run_workers(threads, |_| {
        iterate(config, counter, |body| {
            let token = lock.lock();
            body();
            // SAFETY: token was just produced by this lock.
            unsafe { lock.unlock(token) };
        });
    })
}

fn drive_mcs(
    lock: &McsLock,
    threads: usize,
    config: &LockBenchConfig,
    counter: &PlainCounter,
) -> Duration {
    run_workers(threads, |_| {
        // One node per worker, reused for every acquisition.
        let node = McsNode::new();
        iterate(config, counter, |body| unsafe {
            // SAFETY: `node` outlives the loop and is released before reuse.
            lock.acquire(&node);
            body();
            lock.release(&node);
        });
    })
}

fn drive_std(
    lock: &Mutex<()>,
    threads: usize,
    config: &LockBenchConfig,
    counter: &PlainCounter,
) -> Duration {
    run_workers(threads, |_| {
        iterate(config, counter, |body| {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            body();
        });
    })
}

/// One timed, verified run of `kind` with `threads` workers.
pub fn run_one(
    kind: LockKind,
    threads: usize,
    config: &LockBenchConfig,
    backoff: Backoff,
) -> Result<LockSample, BenchError> {
    let counter = PlainCounter::new();
    let elapsed = match kind {
        LockKind::Tas => drive_raw(&TasLock::new(), threads, config, &counter),
        LockKind::TasBackoff => {
            drive_raw(&TasLock::with_backoff(backoff), threads, config, &counter)
        }
        LockKind::Ttas => drive_raw(&TtasLock::new(), threads, config, &counter),
        LockKind::TtasBackoff => {
            drive_raw(&TtasLock::with_backoff(backoff), threads, config, &counter)
        }
        LockKind::Mcs => drive_mcs(&McsLock::new(), threads, config, &counter),
        LockKind::StdMutex => drive_std(&Mutex::new(()), threads, config, &counter),
    };

    let expected = (threads * config.iterations) as u64;
    let actual = counter.into_inner();
    if actual != expected {
        return Err(BenchError::CorrectnessFailed {
            primitive: kind.name().to_string(),
            threads,
            expected,
            actual,
        });
    }

    let sample = LockSample {
        kind,
        threads,
        elapsed_ms: elapsed.as_secs_f64() * 1_000.0,
    };
    debug!(lock = %kind, threads, elapsed_ms = sample.elapsed_ms, "lock run complete");
    Ok(sample)
}

pub fn run(config: &LockBenchConfig, backoff: Backoff) -> Result<LockReport, BenchError> {
    let mut rows = Vec::with_capacity(config.threads.len());
    for &threads in &config.threads {
        info!(threads, iterations = config.iterations, "benchmarking locks");
        let mut millis = Vec::with_capacity(config.kinds.len());
        for &kind in &config.kinds {
            millis.push(run_one(kind, threads, config, backoff)?.elapsed_ms);
        }
        rows.push(LockRow { threads, millis });
    }
    Ok(LockReport {
        iterations: config.iterations,
        kinds: config.kinds.clone(),
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyOutcome {
    pub kind: LockKind,
    pub runs: usize,
    pub passed: usize,
}

/// Repeats the fixed scenario `runs` times per kind and counts passing runs.
/// A failure is reported in the outcome rather than aborting the loop.
pub fn verify(
    kinds: &[LockKind],
    runs: usize,
    threads: usize,
    iterations: usize,
    backoff: Backoff,
) -> Vec<VerifyOutcome> {
    let config = LockBenchConfig {
        threads: vec![threads],
        iterations,
        critical_work: 0,
        outside_work: 0,
        kinds: kinds.to_vec(),
    };

    kinds
        .iter()
        .map(|&kind| {
            let passed = (0..runs)
                .filter(|_| match run_one(kind, threads, &config, backoff) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::error!(lock = %kind, "{}", e);
                        false
                    }
                })
                .count();
            VerifyOutcome { kind, runs, passed }
        })
        .collect()
}

/// One row per kind with its runs and passes.
pub fn render_verify(outcomes: &[VerifyOutcome]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>15}{:>10}{:>10}", "Lock", "Runs", "Passed");
    for outcome in outcomes {
        let _ = writeln!(
            out,
            "{:>15}{:>10}{:>10}",
            outcome.kind.name(),
            outcome.runs,
            outcome.passed
        );
    }
    out
}

/// The first kind that missed a run, as an error.
pub fn check_verified(outcomes: &[VerifyOutcome]) -> Result<(), BenchError> {
    match outcomes.iter().find(|o| o.passed != o.runs) {
        Some(o) => Err(BenchError::VerificationFailed {
            primitive: o.kind.name().to_string(),
            runs: o.runs,
            passed: o.passed,
        }),
        None => Ok(()),
    }
}
