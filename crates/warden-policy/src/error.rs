//! Error types for the warden-policy crate.

use thiserror::Error;

use crate::types::PolicyId;

/// Errors returned by a [`PolicyCatalog`](crate::PolicyCatalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The policy does not exist, typically because an operator deleted it.
    #[error("policy not found: {policy_id}")]
    NotFound {
        /// The identifier that was looked up.
        policy_id: PolicyId,
    },

    /// The backing store could not answer the lookup.
    #[error("policy store error: {reason}")]
    Store {
        /// Description of the store failure.
        reason: String,
    },

    /// Reading the catalog file failed.
    #[error("policy catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl CatalogError {
    /// Returns true if this error means the policy no longer exists.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_not_found() {
        let err = CatalogError::NotFound {
            policy_id: PolicyId::new(7),
        };
        assert_eq!(err.to_string(), "policy not found: 7");
        assert!(err.is_not_found());
    }

    #[test]
    fn error_display_store() {
        let err = CatalogError::Store {
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "policy store error: connection reset");
        assert!(!err.is_not_found());
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: CatalogError = json_err.into();
        assert!(matches!(err, CatalogError::SerializationError(_)));
    }
}
