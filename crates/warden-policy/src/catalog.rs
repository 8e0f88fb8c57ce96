//! Read access to the policy catalog.
//!
//! The webhook engine resolves policies by identifier through the
//! [`PolicyCatalog`] trait. Two backends ship with the crate: an in-memory map
//! and a read-only JSON file.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::types::{Policy, PolicyId};

/// Lookup of policy metadata by identifier.
pub trait PolicyCatalog: Send + Sync {
    /// Fetches a policy.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the policy was deleted, or another
    /// variant if the store could not be read.
    fn get_policy(&self, policy_id: PolicyId) -> impl Future<Output = Result<Policy>> + Send;
}

impl<T: PolicyCatalog> PolicyCatalog for Arc<T> {
    fn get_policy(&self, policy_id: PolicyId) -> impl Future<Output = Result<Policy>> + Send {
        (**self).get_policy(policy_id)
    }
}

/// Simple in-memory policy catalog.
#[derive(Debug, Default)]
pub struct MemoryPolicyCatalog {
    policies: RwLock<HashMap<PolicyId, Policy>>,
}

impl MemoryPolicyCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given policies.
    #[must_use]
    pub fn with_policies(policies: impl IntoIterator<Item = Policy>) -> Self {
        let catalog = Self::new();
        for policy in policies {
            catalog.insert(policy);
        }
        catalog
    }

    /// Inserts or replaces a policy.
    pub fn insert(&self, policy: Policy) {
        debug!(policy_id = %policy.id, name = %policy.name, "stored policy");
        self.policies.write().insert(policy.id, policy);
    }

    /// Deletes a policy. Returns the removed record, if any.
    pub fn remove(&self, policy_id: PolicyId) -> Option<Policy> {
        self.policies.write().remove(&policy_id)
    }

    /// Returns all policies ordered by identifier.
    #[must_use]
    pub fn list(&self) -> Vec<Policy> {
        let mut policies: Vec<Policy> = self.policies.read().values().cloned().collect();
        policies.sort_by_key(|p| p.id);
        policies
    }

    /// Returns the number of policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.read().len()
    }

    /// Returns true if the catalog has no policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.read().is_empty()
    }

    fn lookup(&self, policy_id: PolicyId) -> Result<Policy> {
        self.policies
            .read()
            .get(&policy_id)
            .cloned()
            .ok_or(CatalogError::NotFound { policy_id })
    }
}

impl PolicyCatalog for MemoryPolicyCatalog {
    async fn get_policy(&self, policy_id: PolicyId) -> Result<Policy> {
        self.lookup(policy_id)
    }
}

/// Policy catalog loaded from a JSON array of policy records.
///
/// The file is read once at [`open`](Self::open); call
/// [`reload`](Self::reload) to pick up edits.
#[derive(Debug)]
pub struct JsonFilePolicyCatalog {
    path: PathBuf,
    inner: MemoryPolicyCatalog,
}

impl JsonFilePolicyCatalog {
    /// Opens the catalog at `path`. A missing file is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let catalog = Self {
            path: path.as_ref().to_path_buf(),
            inner: MemoryPolicyCatalog::new(),
        };
        catalog.reload()?;
        Ok(catalog)
    }

    /// Re-reads the file, replacing the in-memory contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn reload(&self) -> Result<()> {
        let policies: Vec<Policy> = match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut map = self.inner.policies.write();
        map.clear();
        map.extend(policies.into_iter().map(|p| (p.id, p)));
        info!(path = %self.path.display(), count = map.len(), "loaded policy catalog");
        Ok(())
    }

    /// Returns the catalog file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all policies ordered by identifier.
    #[must_use]
    pub fn list(&self) -> Vec<Policy> {
        self.inner.list()
    }
}

impl PolicyCatalog for JsonFilePolicyCatalog {
    async fn get_policy(&self, policy_id: PolicyId) -> Result<Policy> {
        self.inner.lookup(policy_id)
    }
}
