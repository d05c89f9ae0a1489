///
/// spinsync-bench CLI - Correctness and timing driver for the spinsync primitives
///
/// Provides one command per experiment:
/// - spinsync-bench locks: time every lock per thread count
/// - spinsync-bench barrier: sense-reversing barrier against std::sync::Barrier
/// - spinsync-bench counters: time each increment strategy
/// - spinsync-bench verify: repeat a fixed mutual exclusion run and count passes
/// - spinsync-bench all: locks, barrier and counters in sequence
///

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;

use spinsync_bench::{barrier, counters, locks, BenchConfig, BenchError, LockKind};
use spinsync_counters::CounterKind;

#[derive(Parser)]
#[command(name = "spinsync-bench")]
#[command(author, version, about = "Benchmark spinsync primitives", long_about = None)]
struct Cli {
    /// TOML file with benchmark parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print reports as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time every lock for each thread count
    Locks {
        /// Thread counts, comma separated
        #[arg(long, value_delimiter = ',')]
        threads: Option<Vec<usize>>,

        /// Critical sections per thread
        #[arg(long)]
        iterations: Option<usize>,

        /// Primality candidate tested inside the critical section
        #[arg(long)]
        critical_work: Option<u64>,

        /// Primality tests outside the critical section per iteration
        #[arg(long)]
        outside_work: Option<usize>,

        /// Locks to run, comma separated
        #[arg(long, value_delimiter = ',')]
        kinds: Option<Vec<LockKind>>,
    },

    /// Time the sense-reversing barrier against std::sync::Barrier
    Barrier {
        #[arg(long)]
        threads: Option<usize>,

        /// Barrier waits per thread
        #[arg(long)]
        phases: Option<usize>,
    },

    /// Time the counter increment strategies
    Counters {
        #[arg(long)]
        threads: Option<usize>,

        /// Increments per thread
        #[arg(long)]
        operations: Option<usize>,

        /// Strategies to run (mutex, cas, faa), comma separated
        #[arg(long, value_delimiter = ',')]
        kinds: Option<Vec<CounterKind>>,
    },

    /// Repeat a fixed mutual exclusion run and count passes
    Verify {
        #[arg(long, default_value_t = 100)]
        runs: usize,

        #[arg(long, default_value_t = 4)]
        threads: usize,

        /// Critical sections per thread in each run
        #[arg(long, default_value_t = 10_000)]
        iterations: usize,

        /// Locks to verify, comma separated
        #[arg(long, value_delimiter = ',')]
        kinds: Option<Vec<LockKind>>,
    },

    /// Run locks, barrier and counters
    All,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn run(cli: Cli) -> Result<(), BenchError> {
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    apply_overrides(&mut config, &cli.command);
    config.validate()?;
    let backoff = config.backoff.to_backoff()?;

    match cli.command {
        Commands::Locks { .. } => {
            let report = locks::run(&config.locks, backoff)?;
            emit(cli.json, &report, report.render())
        }
        Commands::Barrier { .. } => {
            let report = barrier::run(&config.barrier, backoff)?;
            emit(cli.json, &report, report.render())
        }
        Commands::Counters { .. } => {
            let report = counters::run(&config.counters, backoff)?;
            emit(cli.json, &report, report.render())
        }
        Commands::Verify {
            runs,
            threads,
            iterations,
            kinds,
        } => {
            let kinds = kinds.unwrap_or_else(|| LockKind::ALL.to_vec());
            let outcomes = locks::verify(&kinds, runs, threads, iterations, backoff);
            emit(cli.json, &outcomes, locks::render_verify(&outcomes))?;
            locks::check_verified(&outcomes)
        }
        Commands::All => {
            let locks = locks::run(&config.locks, backoff)?;
            let barrier = barrier::run(&config.barrier, backoff)?;
            let counters = counters::run(&config.counters, backoff)?;
            if cli.json {
                let all = serde_json::json!({
                    "locks": locks,
                    "barrier": barrier,
                    "counters": counters,
                });
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                println!("{}", locks.render());
                println!("{}", barrier.render());
                print!("{}", counters.render());
            }
            Ok(())
        }
    }
}

fn apply_overrides(config: &mut BenchConfig, command: &Commands) {
    match command {
        Commands::Locks {
            threads,
            iterations,
            critical_work,
            outside_work,
            kinds,
        } => {
            if let Some(threads) = threads {
                config.locks.threads = threads.clone();
            }
            if let Some(iterations) = iterations {
                config.locks.iterations = *iterations;
            }
            if let Some(work) = critical_work {
                config.locks.critical_work = *work;
            }
            if let Some(work) = outside_work {
                config.locks.outside_work = *work;
            }
            if let Some(kinds) = kinds {
                config.locks.kinds = kinds.clone();
            }
        }
        Commands::Barrier { threads, phases } => {
            if let Some(threads) = threads {
                config.barrier.threads = *threads;
            }
            if let Some(phases) = phases {
                config.barrier.phases = *phases;
            }
        }
        Commands::Counters {
            threads,
            operations,
            kinds,
        } => {
            if let Some(threads) = threads {
                config.counters.threads = *threads;
            }
            if let Some(operations) = operations {
                config.counters.operations = *operations;
            }
            if let Some(kinds) = kinds {
                config.counters.kinds = kinds.clone();
            }
        }
        Commands::Verify { .. } | Commands::All => {}
    }
}

fn emit<T: Serialize>(json: bool, report: &T, table: String) -> Result<(), BenchError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", table);
    }
    Ok(())
}
