//! Set state shared by the in-memory and file-backed stores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warden_policy::{HostId, PolicyId, PolicySetHost};

/// Current on-disk format version.
pub(crate) const STATE_VERSION: u32 = 1;

/// Failing hosts keyed by policy, then by host identifier.
///
/// A policy entry is dropped as soon as its last host is removed, so every
/// key in `sets` has at least one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FailingSets {
    sets: BTreeMap<PolicyId, BTreeMap<HostId, String>>,
}

impl FailingSets {
    pub(crate) fn policies(&self) -> Vec<PolicyId> {
        self.sets.keys().copied().collect()
    }

    /// Returns true if the host was not already present.
    pub(crate) fn insert(&mut self, policy_id: PolicyId, host: PolicySetHost) -> bool {
        let members = self.sets.entry(policy_id).or_default();
        if members.contains_key(&host.id) {
            return false;
        }
        members.insert(host.id, host.hostname);
        true
    }

    pub(crate) fn hosts(&self, policy_id: PolicyId) -> Vec<PolicySetHost> {
        self.sets.get(&policy_id).map_or_else(Vec::new, |members| {
            members
                .iter()
                .map(|(id, hostname)| PolicySetHost::new(*id, hostname.clone()))
                .collect()
        })
    }

    /// Returns the number of hosts actually removed.
    pub(crate) fn remove(&mut self, policy_id: PolicyId, hosts: &[PolicySetHost]) -> usize {
        let Some(members) = self.sets.get_mut(&policy_id) else {
            return 0;
        };
        let removed = hosts
            .iter()
            .filter(|host| members.remove(&host.id).is_some())
            .count();
        if members.is_empty() {
            self.sets.remove(&policy_id);
        }
        removed
    }

    pub(crate) fn remove_set(&mut self, policy_id: PolicyId) -> bool {
        self.sets.remove(&policy_id).is_some()
    }

    pub(crate) fn to_persisted(&self) -> PersistedState {
        PersistedState {
            version: STATE_VERSION,
            sets: self
                .sets
                .keys()
                .map(|policy_id| PersistedSet {
                    policy_id: *policy_id,
                    hosts: self.hosts(*policy_id),
                })
                .collect(),
        }
    }

    pub(crate) fn from_persisted(state: PersistedState) -> Self {
        let mut sets = Self::default();
        for set in state.sets {
            for host in set.hosts {
                sets.insert(set.policy_id, host);
            }
        }
        sets
    }
}

/// Serialized form of [`FailingSets`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistedState {
    pub(crate) version: u32,
    pub(crate) sets: Vec<PersistedSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistedSet {
    pub(crate) policy_id: PolicyId,
    pub(crate) hosts: Vec<PolicySetHost>,
}
