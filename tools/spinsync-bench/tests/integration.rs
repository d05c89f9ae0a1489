///
/// # Integration Tests for spinsync-bench
///
/// End-to-end runs driven from a config file on disk: loading and
/// validating spinsync.toml, then small lock, barrier, counter and verify
/// runs whose correctness checks must all pass.
///

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use spinsync_bench::{barrier, counters, locks, BenchConfig, BenchError, LockKind};
use spinsync_counters::CounterKind;

const SMALL_CONFIG: &str = r#"
[locks]
threads = [1, 3]
iterations = 2000
critical_work = 97
outside_work = 1

[barrier]
threads = 3
phases = 2000

[counters]
threads = 3
operations = 5000
kinds = ["compare-swap", "fetch-add"]

[backoff]
start_us = 1
cap_us = 32
"#;

fn write_config(dir: &Path, content: &str) -> std::io::Result<std::path::PathBuf> {
    let path = dir.join("spinsync.toml");
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn test_full_run_from_config_file() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), SMALL_CONFIG).unwrap();

    let config = BenchConfig::load(&path).unwrap();
    config.validate().unwrap();
    let backoff = config.backoff.to_backoff().unwrap();

    let report = locks::run(&config.locks, backoff).unwrap();
    assert_eq!(report.kinds, LockKind::ALL.to_vec());
    let threads: Vec<_> = report.rows.iter().map(|row| row.threads).collect();
    assert_eq!(threads, vec![1, 3]);

    let report = barrier::run(&config.barrier, backoff).unwrap();
    assert_eq!(report.threads, 3);

    let report = counters::run(&config.counters, backoff).unwrap();
    let kinds: Vec<_> = report.rows.iter().map(|row| row.kind).collect();
    assert_eq!(kinds, vec![CounterKind::CompareSwap, CounterKind::FetchAdd]);
}

#[test]
fn test_reports_serialize_to_json() {
    let config = BenchConfig::parse(SMALL_CONFIG).unwrap();
    let backoff = config.backoff.to_backoff().unwrap();

    let report = counters::run(&config.counters, backoff).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["threads"], 3);
    assert_eq!(json["rows"][0]["kind"], "compare-swap");

    let report = barrier::run(&config.barrier, backoff).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["phases"], 2000);
    assert!(json["sense_reversing_secs"].is_f64());
}

#[test]
fn test_verify_every_lock() {
    let config = BenchConfig::parse(SMALL_CONFIG).unwrap();
    let backoff = config.backoff.to_backoff().unwrap();

    let outcomes = locks::verify(&LockKind::ALL, 10, 4, 1_000, backoff);
    assert_eq!(outcomes.len(), LockKind::ALL.len());
    for outcome in &outcomes {
        assert_eq!(outcome.passed, 10, "{}", outcome.kind);
    }
    assert!(locks::check_verified(&outcomes).is_ok());
}

#[test]
fn test_missing_config_file() {
    let temp = TempDir::new().unwrap();
    let err = BenchConfig::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, BenchError::ConfigRead { .. }));
}

#[test]
fn test_invalid_config_file() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "[locks]\niterations = 0\n").unwrap();
    let config = BenchConfig::load(&path).unwrap();
    assert!(matches!(config.validate(), Err(BenchError::InvalidConfig(_))));

    let path = write_config(temp.path(), "[locks\n").unwrap();
    assert!(matches!(BenchConfig::load(&path), Err(BenchError::ConfigParse(_))));
}
