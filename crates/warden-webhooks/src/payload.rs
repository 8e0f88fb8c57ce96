//! Webhook payload for failing policies.
//!
//! The JSON shape is consumed by external receivers and must stay stable:
//!
//! ```json
//! {
//!   "timestamp": "2021-10-22T12:00:00Z",
//!   "policy": { "id": 7, "name": "Disk encryption enabled", ... },
//!   "hosts": [
//!     { "id": 101, "hostname": "alice-laptop", "url": "https://fleet.example.com/hosts/101" }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_policy::{HostId, Policy, PolicySetHost};

use crate::config::ServerUrl;

/// A failing host as it appears in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailingHost {
    /// Host identifier.
    pub id: HostId,
    /// Host display name.
    pub hostname: String,
    /// Link to the host page on the server.
    pub url: String,
}

impl FailingHost {
    /// Builds the payload entry for a failing-set member.
    #[must_use]
    pub fn from_set_host(host: &PolicySetHost, server_url: &ServerUrl) -> Self {
        Self {
            id: host.id,
            hostname: host.hostname.clone(),
            url: server_url.host_url(host.id),
        }
    }
}

/// Body POSTed to the failing-policy webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailingPoliciesPayload {
    /// When the cycle ran.
    pub timestamp: DateTime<Utc>,
    /// The full policy record.
    pub policy: Policy,
    /// Hosts failing the policy, in snapshot order.
    #[serde(rename = "hosts")]
    pub failing_hosts: Vec<FailingHost>,
}

impl FailingPoliciesPayload {
    /// Builds a payload from a failing-set snapshot.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        policy: Policy,
        hosts: &[PolicySetHost],
        server_url: &ServerUrl,
    ) -> Self {
        Self {
            timestamp,
            policy,
            failing_hosts: hosts
                .iter()
                .map(|host| FailingHost::from_set_host(host, server_url))
                .collect(),
        }
    }

    /// Returns the identifiers of the hosts in this payload.
    #[must_use]
    pub fn host_ids(&self) -> Vec<HostId> {
        self.failing_hosts.iter().map(|h| h.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use warden_policy::PolicyId;

    use super::*;

    fn sample_policy() -> Policy {
        let created = Utc.with_ymd_and_hms(2021, 10, 1, 9, 0, 0).unwrap();
        let mut policy = Policy::new(
            PolicyId::new(7),
            "Disk encryption enabled",
            "SELECT 1 FROM disk_encryption WHERE encrypted = 1;",
        );
        policy.created_at = created;
        policy.updated_at = created;
        policy
    }

    #[test]
    fn builds_hosts_with_links_in_snapshot_order() {
        let server = ServerUrl::parse("https://fleet.example.com").expect("server url");
        let hosts = [
            PolicySetHost::new(101, "alice-laptop"),
            PolicySetHost::new(102, "bob-laptop"),
        ];
        let payload = FailingPoliciesPayload::new(Utc::now(), sample_policy(), &hosts, &server);

        assert_eq!(payload.host_ids(), vec![HostId::new(101), HostId::new(102)]);
        assert_eq!(payload.failing_hosts[0].url, "https://fleet.example.com/hosts/101");
        assert_eq!(payload.failing_hosts[1].hostname, "bob-laptop");
    }

    #[test]
    fn wire_shape_is_stable() {
        let server = ServerUrl::parse("https://fleet.example.com/").expect("server url");
        let timestamp = Utc.with_ymd_and_hms(2021, 10, 22, 12, 0, 0).unwrap();
        let payload = FailingPoliciesPayload::new(
            timestamp,
            sample_policy(),
            &[PolicySetHost::new(101, "alice-laptop")],
            &server,
        );

        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value["timestamp"], json!("2021-10-22T12:00:00Z"));
        assert_eq!(value["policy"]["id"], json!(7));
        assert_eq!(value["policy"]["name"], json!("Disk encryption enabled"));
        assert_eq!(value["policy"]["purpose"], json!("informational"));
        assert_eq!(
            value["hosts"],
            json!([{
                "id": 101,
                "hostname": "alice-laptop",
                "url": "https://fleet.example.com/hosts/101"
            }])
        );
        assert!(value.get("failing_hosts").is_none());
    }

    #[test]
    fn empty_snapshot_builds_empty_host_list() {
        let server = ServerUrl::parse("https://fleet.example.com").expect("server url");
        let payload = FailingPoliciesPayload::new(Utc::now(), sample_policy(), &[], &server);
        assert!(payload.failing_hosts.is_empty());
    }
}
