//! In-process failing-policy set.

use parking_lot::RwLock;
use tracing::debug;
use warden_policy::{PolicyId, PolicySetHost};

use crate::error::Result;
use crate::state::FailingSets;
use crate::traits::FailingPolicySet;

/// Failing-policy set held in process memory.
///
/// Every operation runs under a single lock, so concurrent evaluation
/// workers and webhook triggers in the same process see atomic set
/// semantics. State is lost on restart; use
/// [`JsonFileFailingPolicySet`](crate::JsonFileFailingPolicySet) when it must
/// survive one.
#[derive(Debug, Default)]
pub struct MemoryFailingPolicySet {
    state: RwLock<FailingSets>,
}

impl MemoryFailingPolicySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FailingPolicySet for MemoryFailingPolicySet {
    async fn list_sets(&self) -> Result<Vec<PolicyId>> {
        Ok(self.state.read().policies())
    }

    async fn add_host(&self, policy_id: PolicyId, host: PolicySetHost) -> Result<()> {
        let host_id = host.id;
        if self.state.write().insert(policy_id, host) {
            debug!(policy_id = %policy_id, host_id = %host_id, "host added to failing set");
        }
        Ok(())
    }

    async fn list_hosts(&self, policy_id: PolicyId) -> Result<Vec<PolicySetHost>> {
        Ok(self.state.read().hosts(policy_id))
    }

    async fn remove_hosts(&self, policy_id: PolicyId, hosts: &[PolicySetHost]) -> Result<()> {
        let removed = self.state.write().remove(policy_id, hosts);
        debug!(policy_id = %policy_id, requested = hosts.len(), removed, "removed hosts from failing set");
        Ok(())
    }

    async fn remove_set(&self, policy_id: PolicyId) -> Result<()> {
        if self.state.write().remove_set(policy_id) {
            debug!(policy_id = %policy_id, "dropped failing set");
        }
        Ok(())
    }
}
