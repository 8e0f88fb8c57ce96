//! The [`FailingPolicySet`] trait implemented by every backend.

use std::future::Future;
use std::sync::Arc;

use warden_policy::{PolicyId, PolicySetHost};

use crate::error::Result;

/// Registry of hosts currently failing each policy.
///
/// Written by the policy evaluation workers on every failing result and
/// drained by the webhook trigger after a confirmed delivery. Backends must
/// make each operation atomic: callers never read-modify-write the set
/// themselves.
pub trait FailingPolicySet: Send + Sync {
    /// Lists the policies that currently have at least one failing host,
    /// in ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn list_sets(&self) -> impl Future<Output = Result<Vec<PolicyId>>> + Send;

    /// Records `host` as failing `policy_id`.
    ///
    /// Adding a host identifier that is already present is a no-op; the
    /// hostname recorded first is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn add_host(
        &self,
        policy_id: PolicyId,
        host: PolicySetHost,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Returns a point-in-time snapshot of the hosts failing `policy_id`,
    /// ordered by host identifier. Unknown policies yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn list_hosts(
        &self,
        policy_id: PolicyId,
    ) -> impl Future<Output = Result<Vec<PolicySetHost>>> + Send;

    /// Removes exactly the given hosts (matched by identifier) from the set
    /// of `policy_id`. Absent hosts are ignored; hosts not named in `hosts`
    /// are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn remove_hosts(
        &self,
        policy_id: PolicyId,
        hosts: &[PolicySetHost],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Drops the whole set for `policy_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn remove_set(&self, policy_id: PolicyId) -> impl Future<Output = Result<()>> + Send;
}

impl<T: FailingPolicySet> FailingPolicySet for Arc<T> {
    fn list_sets(&self) -> impl Future<Output = Result<Vec<PolicyId>>> + Send {
        (**self).list_sets()
    }

    fn add_host(
        &self,
        policy_id: PolicyId,
        host: PolicySetHost,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).add_host(policy_id, host)
    }

    fn list_hosts(
        &self,
        policy_id: PolicyId,
    ) -> impl Future<Output = Result<Vec<PolicySetHost>>> + Send {
        (**self).list_hosts(policy_id)
    }

    fn remove_hosts(
        &self,
        policy_id: PolicyId,
        hosts: &[PolicySetHost],
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).remove_hosts(policy_id, hosts)
    }

    fn remove_set(&self, policy_id: PolicyId) -> impl Future<Output = Result<()>> + Send {
        (**self).remove_set(policy_id)
    }
}
