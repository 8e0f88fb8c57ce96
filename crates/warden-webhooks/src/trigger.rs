//! The failing-policy webhook cycle.
//!
//! [`FailingPoliciesTrigger::run_cycle`] is invoked by an external scheduler.
//! For every monitored policy it snapshots the failing set, delivers one
//! notification and prunes exactly the delivered snapshot. Processing is
//! sequential and stops at the first fatal error.
//!
//! Overlapping cycles are not excluded from each other, so delivery is
//! at-least-once: two cycles may both deliver the same snapshot before either
//! prunes it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;
use uuid::Uuid;
use warden_failing::FailingPolicySet;
use warden_policy::{CatalogError, PolicyCatalog, PolicyId};

use crate::config::{AppConfig, ServerUrl};
use crate::error::{CycleError, Result};
use crate::payload::FailingPoliciesPayload;
use crate::transport::Transport;

/// What happened to one monitored policy during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolicyOutcome {
    Deleted,
    NothingFailing,
    Delivered { hosts: usize },
}

/// Settings resolved once per cycle.
struct CycleTarget {
    server_url: ServerUrl,
    destination: Url,
    timeout: Duration,
}

impl CycleTarget {
    fn resolve(config: &AppConfig) -> Result<Self> {
        let webhook = &config.webhook_settings.failing_policies_webhook;
        Ok(Self {
            server_url: config.server_settings.server_url()?,
            destination: webhook.destination_url()?,
            timeout: webhook.timeout()?,
        })
    }
}

/// Orchestrates the failing-policy webhook.
///
/// Generic over the policy catalog, the failing-set store and the outbound
/// transport so each can be swapped independently.
#[derive(Debug)]
pub struct FailingPoliciesTrigger<C, S, T> {
    catalog: C,
    failing: S,
    transport: T,
}

impl<C, S, T> FailingPoliciesTrigger<C, S, T>
where
    C: PolicyCatalog,
    S: FailingPolicySet,
    T: Transport,
{
    /// Creates a trigger over the given collaborators.
    pub const fn new(catalog: C, failing: S, transport: T) -> Self {
        Self {
            catalog,
            failing,
            transport,
        }
    }

    /// Returns the policy catalog.
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Returns the failing-set store.
    pub const fn failing_sets(&self) -> &S {
        &self.failing
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs one webhook cycle against a configuration snapshot.
    ///
    /// `now` is stamped on every payload sent by this cycle.
    ///
    /// # Errors
    ///
    /// Returns the first fatal condition: an invalid configuration, a catalog
    /// error other than a deleted policy, a failing-set error or a delivery
    /// failure. Policies after the failing one are not processed.
    pub async fn run_cycle(&self, config: &AppConfig, now: DateTime<Utc>) -> Result<()> {
        let webhook = &config.webhook_settings.failing_policies_webhook;
        if !webhook.enable_failing_policies_webhook {
            debug!("failing policies webhook disabled");
            return Ok(());
        }

        let span = info_span!(
            "failing_policies_cycle",
            cycle_id = %Uuid::new_v4(),
            policies = webhook.policy_ids.len(),
        );
        self.run_enabled(config, &webhook.policy_ids, now)
            .instrument(span)
            .await
    }

    /// Builds the payload a cycle would send for `policy_id` right now,
    /// without delivering it or touching the failing set.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid, the policy cannot be
    /// loaded (including when it was deleted) or the set cannot be read.
    pub async fn preview(
        &self,
        config: &AppConfig,
        policy_id: PolicyId,
        now: DateTime<Utc>,
    ) -> Result<FailingPoliciesPayload> {
        preview_payload(&self.catalog, &self.failing, config, policy_id, now).await
    }

    async fn run_enabled(
        &self,
        config: &AppConfig,
        policy_ids: &[PolicyId],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let target = CycleTarget::resolve(config)?;
        let mut delivered = 0usize;
        let mut notified_hosts = 0usize;
        let mut skipped = 0usize;

        for &policy_id in policy_ids {
            match self.process_policy(&target, policy_id, now).await? {
                PolicyOutcome::Delivered { hosts } => {
                    delivered += 1;
                    notified_hosts += hosts;
                }
                PolicyOutcome::Deleted | PolicyOutcome::NothingFailing => skipped += 1,
            }
        }

        info!(delivered, notified_hosts, skipped, "failing policies cycle complete");
        Ok(())
    }

    async fn process_policy(
        &self,
        target: &CycleTarget,
        policy_id: PolicyId,
        now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let policy = match self.catalog.get_policy(policy_id).await {
            Ok(policy) => policy,
            Err(CatalogError::NotFound { .. }) => {
                warn!(policy_id = %policy_id, "monitored policy no longer exists, skipping");
                return Ok(PolicyOutcome::Deleted);
            }
            Err(source) => return Err(CycleError::LoadPolicy { policy_id, source }),
        };

        let snapshot = self
            .failing
            .list_hosts(policy_id)
            .await
            .map_err(|source| CycleError::ListHosts { policy_id, source })?;
        if snapshot.is_empty() {
            debug!(policy_id = %policy_id, "no failing hosts");
            return Ok(PolicyOutcome::NothingFailing);
        }

        let payload = FailingPoliciesPayload::new(now, policy, &snapshot, &target.server_url);
        self.transport
            .post_json(target.destination.as_str(), &payload, target.timeout)
            .await
            .map_err(|source| CycleError::Deliver {
                policy_id,
                url: target.destination.to_string(),
                source,
            })?;
        info!(
            policy_id = %policy_id,
            hosts = snapshot.len(),
            destination = %target.destination,
            "delivered failing policy notification"
        );

        self.failing
            .remove_hosts(policy_id, &snapshot)
            .await
            .map_err(|source| CycleError::RemoveHosts {
                policy_id,
                hosts: payload.host_ids(),
                source,
            })?;
        debug!(policy_id = %policy_id, removed = snapshot.len(), "pruned delivered hosts");

        Ok(PolicyOutcome::Delivered {
            hosts: snapshot.len(),
        })
    }
}

/// Builds the payload for `policy_id` from its current failing set, without
/// delivering it or pruning anything.
///
/// # Errors
///
/// Returns an error if the server URL is invalid, the policy cannot be loaded
/// (including when it was deleted) or the set cannot be read.
pub async fn preview_payload<C, S>(
    catalog: &C,
    failing: &S,
    config: &AppConfig,
    policy_id: PolicyId,
    now: DateTime<Utc>,
) -> Result<FailingPoliciesPayload>
where
    C: PolicyCatalog,
    S: FailingPolicySet,
{
    let server_url = config.server_settings.server_url()?;
    let policy = catalog
        .get_policy(policy_id)
        .await
        .map_err(|source| CycleError::LoadPolicy { policy_id, source })?;
    let hosts = failing
        .list_hosts(policy_id)
        .await
        .map_err(|source| CycleError::ListHosts { policy_id, source })?;
    Ok(FailingPoliciesPayload::new(now, policy, &hosts, &server_url))
}
