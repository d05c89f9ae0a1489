///
/// # Benchmark Configuration
///
/// Parameters for every benchmark, loaded from an optional TOML file. Every
/// field has a default, so an empty file (or no file) yields the standard
/// configuration. Command-line flags override individual values afterwards.
///
/// ## Example spinsync.toml
///
/// ```toml
/// [locks]
/// threads = [1, 2, 4, 8, 16]
/// iterations = 100000
/// critical_work = 1000
/// outside_work = 0
/// kinds = ["tas", "tas-backoff", "ttas", "ttas-backoff", "mcs", "std-mutex"]
///
/// [barrier]
/// threads = 4
/// phases = 1000000
///
/// [counters]
/// threads = 4
/// operations = 1000000
///
/// [backoff]
/// start_us = 1
/// cap_us = 1000
/// ```
///

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use spinsync_core::{Backoff, SyncError};
use spinsync_counters::CounterKind;

use crate::errors::BenchError;
use crate::locks::LockKind;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchConfig {
    pub locks: LockBenchConfig,
    pub barrier: BarrierBenchConfig,
    pub counters: CounterBenchConfig,
    pub backoff: BackoffConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LockBenchConfig {
    pub threads: Vec<usize>,
    pub iterations: usize,
    /// Candidate handed to the primality test inside the critical section.
    pub critical_work: u64,
    /// Primality tests run outside the critical section per iteration.
    pub outside_work: usize,
    pub kinds: Vec<LockKind>,
}

impl Default for LockBenchConfig {
    fn default() -> Self {
        Self {
            threads: vec![1, 2, 4, 8, 16],
            iterations: 100_000,
            critical_work: 1_000,
            outside_work: 0,
            kinds: LockKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BarrierBenchConfig {
    pub threads: usize,
    pub phases: usize,
}

impl Default for BarrierBenchConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            phases: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CounterBenchConfig {
    pub threads: usize,
    pub operations: usize,
    pub kinds: Vec<CounterKind>,
}

impl Default for CounterBenchConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            operations: 1_000_000,
            kinds: CounterKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub start_us: u64,
    pub cap_us: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            start_us: 1,
            cap_us: 1_000,
        }
    }
}

impl BackoffConfig {
    pub fn to_backoff(&self) -> Result<Backoff, SyncError> {
        Backoff::new(
            Duration::from_micros(self.start_us),
            Duration::from_micros(self.cap_us),
        )
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let content = std::fs::read_to_string(path).map_err(|source| BenchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, BenchError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.locks.threads.is_empty() {
            return Err(BenchError::InvalidConfig("locks.threads must not be empty".to_string()));
        }
        if self.locks.threads.contains(&0) {
            return Err(BenchError::InvalidConfig(
                "locks.threads entries must be positive".to_string(),
            ));
        }
        if self.locks.iterations == 0 {
            return Err(BenchError::InvalidConfig("locks.iterations must be positive".to_string()));
        }
        if self.locks.kinds.is_empty() {
            return Err(BenchError::InvalidConfig("locks.kinds must not be empty".to_string()));
        }
        if self.barrier.phases == 0 {
            return Err(BenchError::InvalidConfig("barrier.phases must be positive".to_string()));
        }
        if self.counters.threads == 0 || self.counters.operations == 0 {
            return Err(BenchError::InvalidConfig(
                "counters.threads and counters.operations must be positive".to_string(),
            ));
        }
        // Zero barrier threads is reported by the barrier itself.
        self.backoff.to_backoff()?;
        Ok(())
    }
}
