//! Core types for compliance policies.
//!
//! - [`PolicyId`] and [`HostId`]: numeric identifiers, stable across the fleet
//! - [`Policy`]: a declarative compliance rule as stored in the catalog
//! - [`PolicyPurpose`]: whether a failure is informational or critical
//! - [`PolicySetHost`]: a host recorded as failing a policy

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a policy in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(u32);

impl PolicyId {
    /// Creates a policy identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PolicyId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for PolicyId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Identifier of an enrolled host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(u32);

impl HostId {
    /// Creates a host identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for HostId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for HostId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// How operators should treat a failure of the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPurpose {
    /// Failures are worth knowing about but not urgent.
    #[default]
    Informational,
    /// Failures need prompt remediation.
    Critical,
}

impl PolicyPurpose {
    /// Returns the purpose as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for PolicyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative compliance policy.
///
/// The catalog owns these records; the webhook engine only reads them and
/// forwards them verbatim in the notification payload, so field names are
/// part of the webhook wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier.
    pub id: PolicyId,
    /// Display name.
    pub name: String,
    /// Query evaluated on hosts; a host passes when it returns rows.
    pub query: String,
    /// What the policy checks.
    #[serde(default)]
    pub description: String,
    /// Remediation steps for failing hosts.
    #[serde(default)]
    pub resolution: Option<String>,
    /// Platforms the policy targets (comma separated, empty for all).
    #[serde(default)]
    pub platform: String,
    /// Informational or critical.
    #[serde(default)]
    pub purpose: PolicyPurpose,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author user identifier, if the author still exists.
    #[serde(default)]
    pub author_id: Option<u32>,
    /// Author display name.
    #[serde(default)]
    pub author_name: String,
    /// Author email.
    #[serde(default)]
    pub author_email: String,
    /// When the policy was created.
    pub created_at: DateTime<Utc>,
    /// When the policy was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Creates a policy with the given identifier, name and query.
    #[must_use]
    pub fn new(id: PolicyId, name: impl Into<String>, query: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            query: query.into(),
            description: String::new(),
            resolution: None,
            platform: String::new(),
            purpose: PolicyPurpose::default(),
            tags: Vec::new(),
            author_id: None,
            author_name: String::new(),
            author_email: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the remediation text.
    #[must_use]
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Sets the platform tag.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Sets the purpose.
    #[must_use]
    pub const fn with_purpose(mut self, purpose: PolicyPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the author.
    #[must_use]
    pub fn with_author(
        mut self,
        id: u32,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.author_id = Some(id);
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    /// Returns true if failures of this policy are critical.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.purpose, PolicyPurpose::Critical)
    }
}

/// A host recorded as failing a policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicySetHost {
    /// Host identifier.
    pub id: HostId,
    /// Display name of the host.
    pub hostname: String,
}

impl PolicySetHost {
    /// Creates a failing-set member.
    #[must_use]
    pub fn new(id: impl Into<HostId>, hostname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hostname: hostname.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn policy_id_display_and_get() {
        let id = PolicyId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test_case("42", Some(42) ; "plain number")]
    #[test_case(" 42 ", Some(42) ; "surrounding whitespace")]
    #[test_case("-1", None ; "negative")]
    #[test_case("abc", None ; "not a number")]
    #[test_case("", None ; "empty")]
    fn host_id_from_str(input: &str, expected: Option<u32>) {
        let parsed = input.parse::<HostId>().ok().map(HostId::get);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn ids_serialize_as_numbers() {
        let json = serde_json::to_string(&PolicySetHost::new(101, "alice-laptop")).unwrap();
        assert_eq!(json, r#"{"id":101,"hostname":"alice-laptop"}"#);
        assert_eq!(serde_json::to_string(&PolicyId::new(3)).unwrap(), "3");
    }

    #[test]
    fn purpose_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PolicyPurpose::Critical).unwrap(),
            r#""critical""#
        );
        assert_eq!(PolicyPurpose::default(), PolicyPurpose::Informational);
    }

    #[test]
    fn policy_builder_sets_fields() {
        let policy = Policy::new(PolicyId::new(7), "Disk encryption enabled", "SELECT 1;")
            .with_description("Checks FileVault")
            .with_resolution("Enable FileVault in System Settings")
            .with_platform("darwin")
            .with_purpose(PolicyPurpose::Critical)
            .with_tag("cis")
            .with_author(1, "Jane", "jane@example.com");

        assert_eq!(policy.id, PolicyId::new(7));
        assert_eq!(policy.platform, "darwin");
        assert_eq!(policy.tags, vec!["cis".to_string()]);
        assert_eq!(policy.author_id, Some(1));
        assert!(policy.is_critical());
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let json = r#"{
            "id": 9,
            "name": "Firewall on",
            "query": "SELECT 1 FROM alf WHERE global_state >= 1;",
            "created_at": "2021-10-22T12:00:00Z",
            "updated_at": "2021-10-22T12:00:00Z"
        }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.id, PolicyId::new(9));
        assert_eq!(policy.purpose, PolicyPurpose::Informational);
        assert!(policy.resolution.is_none());
        assert!(policy.tags.is_empty());
    }
}
