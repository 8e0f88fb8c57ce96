//! `warden preview`: show the payload a cycle would send for one policy.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use warden_failing::JsonFileFailingPolicySet;
use warden_policy::{JsonFilePolicyCatalog, PolicyId};
use warden_webhooks::{AppConfig, preview_payload};

use crate::error::CliError;
use crate::output::OutputFormat;

/// Preview command executor.
pub struct PreviewCommand {
    config_path: PathBuf,
    policies_path: PathBuf,
    state_path: PathBuf,
}

impl PreviewCommand {
    /// Create a new preview command.
    #[must_use]
    pub fn new(config: &Path, policies: &Path, state: &Path) -> Self {
        Self {
            config_path: config.to_path_buf(),
            policies_path: policies.to_path_buf(),
            state_path: state.to_path_buf(),
        }
    }

    /// Execute the preview command. Nothing is sent and nothing is pruned.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or stores cannot be loaded, or
    /// the policy does not exist.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        policy_id: PolicyId,
    ) -> Result<(), CliError> {
        let config = AppConfig::from_json_file(&self.config_path)?;
        let catalog = JsonFilePolicyCatalog::open(&self.policies_path)?;
        let failing = JsonFileFailingPolicySet::open(&self.state_path)?;

        let payload = preview_payload(&catalog, &failing, &config, policy_id, Utc::now()).await?;
        format.write(writer, &payload)?;
        Ok(())
    }
}
