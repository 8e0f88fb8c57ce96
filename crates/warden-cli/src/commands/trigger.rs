//! `warden trigger`: run one failing-policy webhook cycle.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info};
use warden_failing::JsonFileFailingPolicySet;
use warden_policy::JsonFilePolicyCatalog;
use warden_webhooks::{AppConfig, FailingPoliciesTrigger, HttpTransport, Transport};

use crate::cli::TriggerArgs;
use crate::error::CliError;
use crate::output::{CycleReport, OutputFormat};

/// Trigger command executor.
pub struct TriggerCommand {
    config_path: PathBuf,
    policies_path: PathBuf,
    state_path: PathBuf,
}

impl TriggerCommand {
    /// Create a new trigger command.
    #[must_use]
    pub fn new(config: &Path, policies: &Path, state: &Path) -> Self {
        Self {
            config_path: config.to_path_buf(),
            policies_path: policies.to_path_buf(),
            state_path: state.to_path_buf(),
        }
    }

    /// Execute the trigger command, delivering over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or stores cannot be loaded, or
    /// if the cycle fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &TriggerArgs,
    ) -> Result<(), CliError> {
        let config = self.load_config()?;
        self.run_with(writer, format, args, config, |config| {
            Ok(HttpTransport::new(&config.transport)?)
        })
        .await
    }

    /// Execute the trigger command with a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_with<W, T>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &TriggerArgs,
        transport: T,
    ) -> Result<(), CliError>
    where
        W: Write,
        T: Transport,
    {
        let config = self.load_config()?;
        self.run_with(writer, format, args, config, move |_| Ok(transport))
            .await
    }

    fn load_config(&self) -> Result<AppConfig, CliError> {
        let config = AppConfig::from_json_file(&self.config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Runs one cycle. The transport is only built when the webhook is
    /// enabled, so transport settings of a disabled config are never read.
    async fn run_with<W, T, F>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &TriggerArgs,
        config: AppConfig,
        make_transport: F,
    ) -> Result<(), CliError>
    where
        W: Write,
        T: Transport,
        F: FnOnce(&AppConfig) -> Result<T, CliError>,
    {
        let webhook = &config.webhook_settings.failing_policies_webhook;
        let now = args.now.unwrap_or_else(Utc::now);
        let report = CycleReport {
            enabled: webhook.enable_failing_policies_webhook,
            timestamp: now,
            monitored_policies: webhook.policy_ids.clone(),
            destination_url: webhook
                .enable_failing_policies_webhook
                .then(|| webhook.destination_url.clone()),
        };

        if report.enabled {
            let catalog = JsonFilePolicyCatalog::open(&self.policies_path)?;
            let failing = JsonFileFailingPolicySet::open(&self.state_path)?;
            let transport = make_transport(&config)?;
            let trigger = FailingPoliciesTrigger::new(catalog, failing, transport);
            if let Err(e) = trigger.run_cycle(&config, now).await {
                error!(policy_id = ?e.policy_id(), error = %e, "failing policies cycle failed");
                return Err(e.into());
            }
            info!(policies = report.monitored_policies.len(), "failing policies cycle succeeded");
        }

        format.write(writer, &report)?;
        Ok(())
    }
}
