//!
//! Counter Benchmark
//!
//! Each configured strategy gets a fresh counter, incremented `operations`
//! times by every worker. The final value must equal `threads * operations`.
//!

use std::fmt::Write as _;

use serde::Serialize;
use spinsync_core::Backoff;
use spinsync_counters::{Counter, CounterKind};
use tracing::{debug, info};

use crate::config::CounterBenchConfig;
use crate::errors::BenchError;
use crate::gate::run_workers;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterRow {
    pub kind: CounterKind,
    pub secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterReport {
    pub threads: usize,
    pub operations: usize,
    pub rows: Vec<CounterRow>,
}

impl CounterReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>15}{:>15}", "Counter", "Seconds");
        for row in &self.rows {
            let _ = writeln!(out, "{:>15}{:>15.3}", row.kind.name(), row.secs);
        }
        out
    }
}

pub fn run_one(
    kind: CounterKind,
    config: &CounterBenchConfig,
    backoff: Backoff,
) -> Result<CounterRow, BenchError> {
    let counter = Counter::with_backoff(kind, backoff);
    let elapsed = run_workers(config.threads, |_| {
        for _ in 0..config.operations {
            counter.increment();
        }
    });

    let expected = (config.threads * config.operations) as u64;
    let actual = counter.get() as u64;
    if actual != expected {
        return Err(BenchError::CorrectnessFailed {
            primitive: format!("{} counter", kind),
            threads: config.threads,
            expected,
            actual,
        });
    }

    debug!(counter = %kind, secs = elapsed.as_secs_f64(), "counter run complete");
    Ok(CounterRow {
        kind,
        secs: elapsed.as_secs_f64(),
    })
}

pub fn run(config: &CounterBenchConfig, backoff: Backoff) -> Result<CounterReport, BenchError> {
    info!(threads = config.threads, operations = config.operations, "benchmarking counters");
    let rows = config
        .kinds
        .iter()
        .map(|&kind| run_one(kind, config, backoff))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CounterReport {
        threads: config.threads,
        operations: config.operations,
        rows,
    })
}
