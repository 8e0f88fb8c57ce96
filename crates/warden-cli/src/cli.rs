//! Command-line argument parsing with clap.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use warden_policy::{HostId, PolicyId};

/// Warden - failing-policy tracking and webhook delivery.
#[derive(Parser, Debug, Clone)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Application configuration file (JSON).
    #[arg(short, long, env = "WARDEN_CONFIG", default_value = "warden.json")]
    pub config: PathBuf,

    /// Policy catalog file (JSON array of policies).
    #[arg(short, long, env = "WARDEN_POLICIES", default_value = "policies.json")]
    pub policies: PathBuf,

    /// Failing-set state file.
    #[arg(short, long, env = "WARDEN_STATE", default_value = "failing-sets.json")]
    pub state: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one failing-policy webhook cycle.
    Trigger(TriggerArgs),

    /// Print the payload that would be sent for a policy, without sending it.
    Preview {
        /// Policy to preview.
        policy_id: PolicyId,
    },

    /// Inspect or edit failing-policy sets.
    Failing {
        /// Failing-set subcommand to execute.
        #[command(subcommand)]
        command: FailingCommands,
    },
}

/// Arguments for the trigger command.
#[derive(Args, Debug, Clone, Default)]
pub struct TriggerArgs {
    /// Timestamp stamped on payloads (RFC 3339). Defaults to now.
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,
}

/// Failing-set subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum FailingCommands {
    /// List failing hosts, for one policy or for every policy.
    List {
        /// Restrict the listing to this policy.
        policy_id: Option<PolicyId>,
    },

    /// Record a host as failing a policy.
    Add {
        /// Policy the host fails.
        policy_id: PolicyId,
        /// Host identifier.
        host_id: HostId,
        /// Host display name.
        hostname: String,
    },

    /// Remove hosts from a policy's failing set.
    Remove {
        /// Policy to edit.
        policy_id: PolicyId,
        /// Hosts to remove.
        #[arg(required = true)]
        host_ids: Vec<HostId>,
    },

    /// Drop a policy's failing set entirely.
    Clear {
        /// Policy to clear.
        policy_id: PolicyId,
    },
}
