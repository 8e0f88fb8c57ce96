//! Error types for the warden-webhooks crate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use warden_failing::FailingSetError;
use warden_policy::{CatalogError, HostId, PolicyId};

/// Invalid or unreadable webhook configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL setting does not parse or is not usable.
    #[error("invalid {field} '{value}': {reason}")]
    InvalidUrl {
        /// The setting name.
        field: &'static str,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A numeric or structural setting is out of range.
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// The setting name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`AppConfig`](crate::AppConfig).
    #[error("failed to parse config {}: {reason}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// Parser error.
        reason: String,
    },
}

/// A single delivery attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The destination did not answer within the timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Destination URL.
        url: String,
        /// The timeout that expired.
        timeout: Duration,
    },

    /// The destination answered with a non-2xx status.
    #[error("{url} responded with status {status}")]
    Status {
        /// Destination URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be sent (DNS, connect, TLS, ...).
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Destination URL.
        url: String,
        /// Transport error description.
        reason: String,
    },

    /// The payload could not be encoded.
    #[error("failed to encode payload: {0}")]
    Serialization(String),

    /// The HTTP client could not be built from the transport settings.
    #[error("invalid transport configuration: {reason}")]
    Client {
        /// Why the client could not be built.
        reason: String,
    },
}

/// The first fatal condition hit during a webhook cycle.
///
/// Every variant past configuration carries the policy being processed so
/// the caller can log and alert with context. A deleted policy is not an
/// error: the cycle skips it.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The configuration snapshot is unusable.
    #[error("invalid webhook configuration: {0}")]
    Config(#[from] ConfigError),

    /// Policy metadata could not be loaded.
    #[error("failed to load policy {policy_id}: {source}")]
    LoadPolicy {
        /// The policy being processed.
        policy_id: PolicyId,
        /// Catalog error.
        source: CatalogError,
    },

    /// The failing set could not be read.
    #[error("listing hosts for failing policy set {policy_id}: {source}")]
    ListHosts {
        /// The policy being processed.
        policy_id: PolicyId,
        /// Store error.
        source: FailingSetError,
    },

    /// The notification could not be delivered.
    #[error("delivering failing policy {policy_id} to '{url}': {source}")]
    Deliver {
        /// The policy being processed.
        policy_id: PolicyId,
        /// Destination URL.
        url: String,
        /// Transport error.
        source: DeliveryError,
    },

    /// The notification was delivered but the set could not be pruned.
    #[error("removing hosts {hosts:?} from failing policy set {policy_id}: {source}")]
    RemoveHosts {
        /// The policy being processed.
        policy_id: PolicyId,
        /// The snapshot that should have been removed.
        hosts: Vec<HostId>,
        /// Store error.
        source: FailingSetError,
    },
}

impl CycleError {
    /// Returns the policy that was being processed, if any.
    #[must_use]
    pub const fn policy_id(&self) -> Option<PolicyId> {
        match self {
            Self::Config(_) => None,
            Self::LoadPolicy { policy_id, .. }
            | Self::ListHosts { policy_id, .. }
            | Self::Deliver { policy_id, .. }
            | Self::RemoveHosts { policy_id, .. } => Some(*policy_id),
        }
    }
}

/// Result type for webhook cycle operations.
pub type Result<T> = std::result::Result<T, CycleError>;
