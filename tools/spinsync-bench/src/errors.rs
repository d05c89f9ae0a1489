///
/// Benchmark harness error types.
///
/// Covers config loading, invalid parameters, primitive construction and
/// failed correctness checks after a run.
///

use std::path::PathBuf;
use thiserror::Error;

use spinsync_core::SyncError;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("{primitive} with {threads} threads counted {actual}, expected {expected}")]
    CorrectnessFailed {
        primitive: String,
        threads: usize,
        expected: u64,
        actual: u64,
    },

    #[error("{primitive}: {passed} of {runs} verification runs passed")]
    VerificationFailed {
        primitive: String,
        runs: usize,
        passed: usize,
    },

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = BenchError::ConfigRead {
            path: PathBuf::from("/tmp/spinsync.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/tmp/spinsync.toml"));
        assert!(err.to_string().contains("missing"));

        let err = BenchError::InvalidConfig("threads must not be empty".to_string());
        assert!(err.to_string().contains("Invalid config"));
        assert!(err.to_string().contains("threads must not be empty"));

        let err = BenchError::from(SyncError::InvalidParticipants { parties: 0 });
        assert!(err.to_string().contains("at least one participant"));

        let err = BenchError::CorrectnessFailed {
            primitive: "tas".to_string(),
            threads: 4,
            expected: 40_000,
            actual: 39_998,
        };
        assert!(err.to_string().contains("tas with 4 threads"));
        assert!(err.to_string().contains("39998"));
        assert!(err.to_string().contains("40000"));

        let err = BenchError::VerificationFailed {
            primitive: "mcs".to_string(),
            runs: 100,
            passed: 99,
        };
        assert_eq!(err.to_string(), "mcs: 99 of 100 verification runs passed");
    }
}
