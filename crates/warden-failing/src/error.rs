//! Error types for failing-set backends.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or mutating a failing-policy set.
#[derive(Debug, Error)]
pub enum FailingSetError {
    /// The backing store did not answer.
    #[error("failing set store unavailable: {reason}")]
    Unavailable {
        /// Description of the outage.
        reason: String,
    },

    /// The persisted state could not be parsed.
    #[error("failing set state at {} is corrupt: {reason}", path.display())]
    Corrupt {
        /// The state file.
        path: PathBuf,
        /// Parser error.
        reason: String,
    },

    /// Encoding the state for persistence failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FailingSetError {
    /// Returns true if retrying the same operation later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Io(_))
    }
}

/// Result type alias for failing-set operations.
pub type Result<T> = std::result::Result<T, FailingSetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unavailable() {
        let err = FailingSetError::Unavailable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failing set store unavailable: connection refused"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn error_display_corrupt() {
        let err = FailingSetError::Corrupt {
            path: PathBuf::from("/var/lib/warden/failing.json"),
            reason: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failing set state at /var/lib/warden/failing.json is corrupt: expected value"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_errors_are_retryable() {
        let err: FailingSetError =
            std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk").into();
        assert!(err.is_retryable());
    }
}
