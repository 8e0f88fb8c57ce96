//! `warden failing`: inspect and edit failing-policy sets.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use warden_failing::{FailingPolicySet, JsonFileFailingPolicySet};
use warden_policy::PolicySetHost;

use crate::cli::FailingCommands;
use crate::error::CliError;
use crate::output::{FailingSetList, FailingSetSummary, OutputFormat, SetMutation};

/// Failing-set command executor.
pub struct FailingCommand {
    state_path: PathBuf,
}

impl FailingCommand {
    /// Create a new failing-set command.
    #[must_use]
    pub fn new(state: &Path) -> Self {
        Self {
            state_path: state.to_path_buf(),
        }
    }

    /// Execute a failing-set subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be read or written.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &FailingCommands,
    ) -> Result<(), CliError> {
        let store = JsonFileFailingPolicySet::open(&self.state_path)?;

        match command {
            FailingCommands::List { policy_id } => {
                let policy_ids = match policy_id {
                    Some(id) => vec![*id],
                    None => store.list_sets().await?,
                };
                let mut sets = Vec::with_capacity(policy_ids.len());
                for policy_id in policy_ids {
                    let hosts = store.list_hosts(policy_id).await?;
                    sets.push(FailingSetSummary { policy_id, hosts });
                }
                format.write(writer, &FailingSetList { sets })?;
            }
            FailingCommands::Add {
                policy_id,
                host_id,
                hostname,
            } => {
                store
                    .add_host(*policy_id, PolicySetHost::new(*host_id, hostname.as_str()))
                    .await?;
                info!(policy_id = %policy_id, host_id = %host_id, "host marked failing");
                let mutation = SetMutation {
                    action: "added",
                    policy_id: *policy_id,
                    hosts: vec![*host_id],
                };
                format.write(writer, &mutation)?;
            }
            FailingCommands::Remove {
                policy_id,
                host_ids,
            } => {
                // Removal matches on identifier only.
                let hosts: Vec<PolicySetHost> = host_ids
                    .iter()
                    .map(|id| PolicySetHost::new(*id, String::new()))
                    .collect();
                store.remove_hosts(*policy_id, &hosts).await?;
                info!(policy_id = %policy_id, count = hosts.len(), "hosts removed from failing set");
                let mutation = SetMutation {
                    action: "removed",
                    policy_id: *policy_id,
                    hosts: host_ids.clone(),
                };
                format.write(writer, &mutation)?;
            }
            FailingCommands::Clear { policy_id } => {
                store.remove_set(*policy_id).await?;
                info!(policy_id = %policy_id, "failing set cleared");
                let mutation = SetMutation {
                    action: "cleared",
                    policy_id: *policy_id,
                    hosts: Vec::new(),
                };
                format.write(writer, &mutation)?;
            }
        }

        Ok(())
    }
}
