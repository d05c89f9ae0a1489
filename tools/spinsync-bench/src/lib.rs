///
/// # spinsync-bench - Benchmark harness for the spinsync primitives
///
/// The library half of the `spinsync-bench` binary, split out so the
/// integration tests can drive the same benchmarks.
///
/// ## Library Usage
///
/// ```rust,ignore
/// use spinsync_bench::{BenchConfig, locks};
///
/// let config = BenchConfig::load(Path::new("spinsync.toml"))?;
/// let report = locks::run(&config.locks, config.backoff.to_backoff()?)?;
/// print!("{}", report.render());
/// ```
///
/// ## CLI
///
/// ```sh
/// spinsync-bench locks --threads 1,2,4 --iterations 10000
/// spinsync-bench barrier --threads 4 --phases 100000
/// spinsync-bench counters --json
/// spinsync-bench verify --runs 100
/// ```
///

pub mod barrier;
pub mod config;
pub mod counters;
pub mod errors;
pub mod gate;
pub mod locks;
pub mod work;

pub use config::{
    BackoffConfig, BarrierBenchConfig, BenchConfig, CounterBenchConfig, LockBenchConfig,
};
pub use errors::BenchError;
pub use locks::LockKind;
