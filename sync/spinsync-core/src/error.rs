///
/// Configuration errors for the spinsync primitives.
///
/// These are the only failures the primitives detect on their own. Misuse at
/// runtime (double release, a missing barrier participant, reusing a linked
/// queue node) is never detected and stalls or corrupts instead.
///

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Barrier needs at least one participant, got {parties}")]
    InvalidParticipants { parties: usize },

    #[error("Invalid backoff: start {start:?} must be non-zero and not exceed cap {cap:?}")]
    InvalidBackoff { start: Duration, cap: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = SyncError::InvalidParticipants { parties: 0 };
        assert!(err.to_string().contains("at least one participant"));
        assert!(err.to_string().contains("got 0"));

        let err = SyncError::InvalidBackoff {
            start: Duration::from_micros(10),
            cap: Duration::from_micros(5),
        };
        assert!(err.to_string().contains("Invalid backoff"));
        assert!(err.to_string().contains("10µs"));
        assert!(err.to_string().contains("5µs"));
    }
}
