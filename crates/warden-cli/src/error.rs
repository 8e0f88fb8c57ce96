//! CLI error types.

use thiserror::Error;
use warden_failing::FailingSetError;
use warden_policy::CatalogError;
use warden_webhooks::{ConfigError, CycleError, DeliveryError};

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The policy catalog could not be read.
    #[error("policy catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The failing-set store failed.
    #[error("failing set error: {0}")]
    FailingSet(#[from] FailingSetError),

    /// The delivery client could not be built.
    #[error("transport error: {0}")]
    Transport(#[from] DeliveryError),

    /// A webhook cycle failed.
    #[error("webhook cycle failed: {0}")]
    Cycle(#[from] CycleError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
