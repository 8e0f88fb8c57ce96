//! # warden-webhooks
//!
//! Failing-policy webhook delivery for Warden.
//!
//! Once per scheduler tick, [`FailingPoliciesTrigger::run_cycle`] walks the
//! monitored policies in configured order. For each policy with failing hosts
//! it POSTs one [`FailingPoliciesPayload`] to the configured destination and,
//! after a successful delivery, prunes exactly the hosts it reported.
//!
//! ## Failure handling
//!
//! - A monitored policy that was deleted is skipped.
//! - Any other catalog, store or delivery error aborts the cycle and is
//!   returned as a [`CycleError`]. Nothing is pruned for the failing policy,
//!   and later policies wait for the next cycle.
//! - No retries happen inside a cycle; the failing set is durable, so the
//!   next tick re-attempts whatever is still failing.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use warden_failing::{FailingPolicySet, MemoryFailingPolicySet};
//! use warden_policy::{MemoryPolicyCatalog, Policy, PolicyId, PolicySetHost};
//! use warden_webhooks::{
//!     AppConfig, FailingPoliciesTrigger, FailingPoliciesWebhookSettings, RecordingTransport,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let policy = PolicyId::new(7);
//! let catalog = MemoryPolicyCatalog::with_policies([Policy::new(
//!     policy,
//!     "Disk encryption enabled",
//!     "SELECT 1 FROM disk_encryption WHERE encrypted = 1;",
//! )]);
//! let failing = Arc::new(MemoryFailingPolicySet::new());
//! failing.add_host(policy, PolicySetHost::new(101, "alice-laptop")).await.unwrap();
//!
//! let mut config = AppConfig::default();
//! config.server_settings.server_url = "https://fleet.example.com".to_string();
//! config.webhook_settings.failing_policies_webhook =
//!     FailingPoliciesWebhookSettings::enabled("https://hooks.example.com/fleet", vec![policy]);
//!
//! let trigger = FailingPoliciesTrigger::new(catalog, failing.clone(), RecordingTransport::new());
//! trigger.run_cycle(&config, Utc::now()).await.unwrap();
//!
//! assert_eq!(trigger.transport().deliveries().len(), 1);
//! assert!(failing.list_hosts(policy).await.unwrap().is_empty());
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod payload;
pub mod transport;
pub mod trigger;

pub use config::{
    AppConfig, DEFAULT_TIMEOUT_SECS, FailingPoliciesWebhookSettings, ServerSettings, ServerUrl,
    TransportSettings, WebhookSettings,
};
pub use error::{ConfigError, CycleError, DeliveryError, Result};
pub use payload::{FailingHost, FailingPoliciesPayload};
pub use transport::{HttpTransport, RecordedDelivery, RecordingTransport, Transport};
pub use trigger::{FailingPoliciesTrigger, preview_payload};
