///
/// Shared counter over a tagged increment strategy.
///
/// The strategy is an enum variant rather than a trait object, so a counter
/// is one concrete type regardless of how it increments.
///

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use spinsync_core::Backoff;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterKind {
    Mutex,
    #[serde(alias = "cas")]
    CompareSwap,
    #[serde(alias = "faa")]
    FetchAdd,
}

impl CounterKind {
    pub const ALL: [CounterKind; 3] = [
        CounterKind::Mutex,
        CounterKind::CompareSwap,
        CounterKind::FetchAdd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CounterKind::Mutex => "mutex",
            CounterKind::CompareSwap => "compare-swap",
            CounterKind::FetchAdd => "fetch-add",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown counter kind '{0}' (expected mutex, compare-swap or fetch-add)")]
pub struct UnknownCounterKind(pub String);

impl FromStr for CounterKind {
    type Err = UnknownCounterKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mutex" => Ok(CounterKind::Mutex),
            "cas" | "compare-swap" => Ok(CounterKind::CompareSwap),
            "faa" | "fetch-add" => Ok(CounterKind::FetchAdd),
            other => Err(UnknownCounterKind(other.to_string())),
        }
    }
}

#[derive(Debug)]
enum Strategy {
    Mutex(Mutex<i64>),
    CompareSwap { value: AtomicI64, backoff: Backoff },
    FetchAdd(AtomicI64),
}

#[derive(Debug)]
pub struct Counter {
    strategy: Strategy,
}

impl Counter {
    pub fn new(kind: CounterKind) -> Self {
        Self::with_backoff(kind, Backoff::DEFAULT)
    }

    /// `backoff` only applies to `CounterKind::CompareSwap`.
    pub fn with_backoff(kind: CounterKind, backoff: Backoff) -> Self {
        let strategy = match kind {
            CounterKind::Mutex => Strategy::Mutex(Mutex::new(0)),
            CounterKind::CompareSwap => Strategy::CompareSwap {
                value: AtomicI64::new(0),
                backoff,
            },
            CounterKind::FetchAdd => Strategy::FetchAdd(AtomicI64::new(0)),
        };
        Self { strategy }
    }

    pub fn kind(&self) -> CounterKind {
        match self.strategy {
            Strategy::Mutex(_) => CounterKind::Mutex,
            Strategy::CompareSwap { .. } => CounterKind::CompareSwap,
            Strategy::FetchAdd(_) => CounterKind::FetchAdd,
        }
    }

    pub fn increment(&self) {
        match &self.strategy {
            Strategy::Mutex(value) => {
                // A poisoned counter still holds a valid integer.
                let mut guard = value.lock().unwrap_or_else(|e| e.into_inner());
                *guard += 1;
            }
            Strategy::CompareSwap { value, backoff } => {
                let mut attempt = 0;
                loop {
                    let current = value.load(Ordering::Relaxed);
                    if value
                        .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Relaxed)
                        .is_ok()
                    {
                        break;
                    }
                    backoff.snooze(&mut attempt);
                }
            }
            Strategy::FetchAdd(value) => {
                value.fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    pub fn get(&self) -> i64 {
        match &self.strategy {
            Strategy::Mutex(value) => *value.lock().unwrap_or_else(|e| e.into_inner()),
            Strategy::CompareSwap { value, .. } | Strategy::FetchAdd(value) => {
                value.load(Ordering::Acquire)
            }
        }
    }
}
