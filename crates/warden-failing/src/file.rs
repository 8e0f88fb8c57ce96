//! Durable failing-policy set backed by a JSON file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use warden_policy::{PolicyId, PolicySetHost};

use crate::error::{FailingSetError, Result};
use crate::state::{FailingSets, PersistedState, STATE_VERSION};
use crate::traits::FailingPolicySet;

/// Failing-policy set stored in a JSON file shared between processes.
///
/// Every operation takes an advisory lock on a sidecar `<file>.lock` and
/// re-reads the file under it: shared for reads, exclusive for mutations.
/// A mutation is a single read-modify-write, persisted with
/// write-to-temp-then-rename before the lock is released, so a host added by
/// another process (or another instance in this one) is never overwritten.
///
/// Lock acquisition blocks the calling thread; critical sections only cover
/// one file read and at most one write.
#[derive(Debug)]
pub struct JsonFileFailingPolicySet {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileFailingPolicySet {
    /// Opens the store at `path`, checking existing state if the file exists.
    ///
    /// # Errors
    ///
    /// Returns `FailingSetError::Corrupt` if the file cannot be parsed, or an
    /// I/O error if it cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let set = Self {
            lock_path: path.with_extension("json.lock"),
            path,
        };
        let policies = set.read(|state| state.policies().len())?;
        info!(path = %set.path.display(), policies, "opened failing policy set");
        Ok(set)
    }

    /// Returns the state file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<fs::File> {
        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn load(&self) -> Result<FailingSets> {
        match fs::read(&self.path) {
            Ok(bytes) => Self::decode(&self.path, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FailingSets::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn decode(path: &Path, bytes: &[u8]) -> Result<FailingSets> {
        let persisted: PersistedState =
            serde_json::from_slice(bytes).map_err(|e| FailingSetError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if persisted.version != STATE_VERSION {
            return Err(FailingSetError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("unsupported state version {}", persisted.version),
            });
        }
        Ok(FailingSets::from_persisted(persisted))
    }

    fn persist(&self, state: &FailingSets) -> Result<()> {
        let body = serde_json::to_vec_pretty(&state.to_persisted())?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            warn!(path = %tmp.display(), error = %e, "failed to replace failing set state");
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary state file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Reads the current file contents under a shared lock.
    fn read<T, F>(&self, inspect: F) -> Result<T>
    where
        F: FnOnce(&FailingSets) -> T,
    {
        let lock = fd_lock::RwLock::new(self.lock_file()?);
        let _guard = lock.read()?;
        let state = self.load()?;
        Ok(inspect(&state))
    }

    /// Re-reads the file under an exclusive lock, applies `mutate` and
    /// persists the result if it reports a change.
    fn update<F>(&self, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut FailingSets) -> bool,
    {
        let mut lock = fd_lock::RwLock::new(self.lock_file()?);
        let _guard = lock.write()?;
        let mut state = self.load()?;
        if !mutate(&mut state) {
            return Ok(false);
        }
        self.persist(&state)?;
        Ok(true)
    }
}

impl FailingPolicySet for JsonFileFailingPolicySet {
    async fn list_sets(&self) -> Result<Vec<PolicyId>> {
        self.read(FailingSets::policies)
    }

    async fn add_host(&self, policy_id: PolicyId, host: PolicySetHost) -> Result<()> {
        let host_id = host.id;
        if self.update(|sets| sets.insert(policy_id, host))? {
            debug!(policy_id = %policy_id, host_id = %host_id, "host added to failing set");
        }
        Ok(())
    }

    async fn list_hosts(&self, policy_id: PolicyId) -> Result<Vec<PolicySetHost>> {
        self.read(|sets| sets.hosts(policy_id))
    }

    async fn remove_hosts(&self, policy_id: PolicyId, hosts: &[PolicySetHost]) -> Result<()> {
        let changed = self.update(|sets| sets.remove(policy_id, hosts) > 0)?;
        debug!(policy_id = %policy_id, requested = hosts.len(), changed, "removed hosts from failing set");
        Ok(())
    }

    async fn remove_set(&self, policy_id: PolicyId) -> Result<()> {
        if self.update(|sets| sets.remove_set(policy_id))? {
            debug!(policy_id = %policy_id, "dropped failing set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(id: u32, name: &str) -> PolicySetHost {
        PolicySetHost::new(id, name)
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let set = JsonFileFailingPolicySet::open(dir.path().join("failing.json")).expect("open");
        assert!(set.list_sets().await.expect("sets").is_empty());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        let policy = PolicyId::new(7);

        {
            let set = JsonFileFailingPolicySet::open(&path).expect("open");
            set.add_host(policy, host(101, "alice-laptop")).await.expect("add");
            set.add_host(policy, host(102, "bob-laptop")).await.expect("add");
        }

        let reopened = JsonFileFailingPolicySet::open(&path).expect("reopen");
        assert_eq!(
            reopened.list_hosts(policy).await.expect("list"),
            vec![host(101, "alice-laptop"), host(102, "bob-laptop")]
        );
    }

    #[tokio::test]
    async fn remove_hosts_is_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        let policy = PolicyId::new(7);

        let set = JsonFileFailingPolicySet::open(&path).expect("open");
        set.add_host(policy, host(101, "alice-laptop")).await.expect("add");
        set.add_host(policy, host(103, "carol-laptop")).await.expect("add");
        set.remove_hosts(policy, &[host(101, "alice-laptop")]).await.expect("remove");

        let reopened = JsonFileFailingPolicySet::open(&path).expect("reopen");
        assert_eq!(
            reopened.list_hosts(policy).await.expect("list"),
            vec![host(103, "carol-laptop")]
        );
    }

    #[tokio::test]
    async fn noop_mutation_does_not_create_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        let set = JsonFileFailingPolicySet::open(&path).expect("open");
        set.remove_hosts(PolicyId::new(1), &[host(1, "a")]).await.expect("remove");
        set.remove_set(PolicyId::new(1)).await.expect("remove set");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/state/failing.json");
        let set = JsonFileFailingPolicySet::open(&path).expect("open");
        set.add_host(PolicyId::new(1), host(1, "a")).await.expect("add");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn second_instance_sees_writes_without_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        let policy = PolicyId::new(7);

        let first = JsonFileFailingPolicySet::open(&path).expect("open first");
        let second = JsonFileFailingPolicySet::open(&path).expect("open second");
        first.add_host(policy, host(101, "alice-laptop")).await.expect("add");

        assert_eq!(
            second.list_hosts(policy).await.expect("list"),
            vec![host(101, "alice-laptop")]
        );
        assert_eq!(second.list_sets().await.expect("sets"), vec![policy]);
    }

    #[tokio::test]
    async fn prune_keeps_host_added_by_other_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        let policy = PolicyId::new(7);

        let trigger_side = JsonFileFailingPolicySet::open(&path).expect("open trigger side");
        let worker_side = JsonFileFailingPolicySet::open(&path).expect("open worker side");
        trigger_side.add_host(policy, host(101, "alice-laptop")).await.expect("seed");
        trigger_side.add_host(policy, host(102, "bob-laptop")).await.expect("seed");

        let snapshot = trigger_side.list_hosts(policy).await.expect("snapshot");
        // Lands while the notification for the snapshot is in flight.
        worker_side.add_host(policy, host(103, "carol-laptop")).await.expect("late add");
        trigger_side.remove_hosts(policy, &snapshot).await.expect("prune");

        let reopened = JsonFileFailingPolicySet::open(&path).expect("reopen");
        assert_eq!(
            reopened.list_hosts(policy).await.expect("list"),
            vec![host(103, "carol-laptop")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_one_file_lose_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        let policy = PolicyId::new(1);

        let writers: Vec<_> = (0..4u32)
            .map(|worker| {
                let set = JsonFileFailingPolicySet::open(&path).expect("open");
                tokio::spawn(async move {
                    for n in 0..25 {
                        let id = worker * 25 + n;
                        set.add_host(policy, host(id, "h")).await.expect("add");
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.expect("writer task");
        }

        let reopened = JsonFileFailingPolicySet::open(&path).expect("reopen");
        assert_eq!(reopened.list_hosts(policy).await.expect("list").len(), 100);
    }

    #[test]
    fn failed_replace_cleans_up_temporary_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A non-empty directory where the state file should be makes rename fail.
        let path = dir.path().join("failing.json");
        fs::create_dir(&path).expect("mkdir");
        fs::write(path.join("occupied"), b"x").expect("write");
        let set = JsonFileFailingPolicySet {
            lock_path: path.with_extension("json.lock"),
            path: path.clone(),
        };

        let mut state = FailingSets::default();
        state.insert(PolicyId::new(7), host(101, "alice-laptop"));
        assert!(set.persist(&state).is_err());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        fs::write(&path, b"{ not json").expect("write");
        let err = JsonFileFailingPolicySet::open(&path).unwrap_err();
        assert!(matches!(err, FailingSetError::Corrupt { .. }));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("failing.json");
        fs::write(&path, br#"{"version": 99, "sets": []}"#).expect("write");
        let err = JsonFileFailingPolicySet::open(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported state version 99"));
    }
}
