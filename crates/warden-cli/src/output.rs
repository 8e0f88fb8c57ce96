//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_policy::{HostId, PolicyId, PolicySetHost};
use warden_webhooks::FailingPoliciesPayload;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Outcome of `warden trigger`.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Whether the webhook is enabled.
    pub enabled: bool,
    /// Timestamp stamped on payloads.
    pub timestamp: DateTime<Utc>,
    /// Policies the cycle walked, in order.
    pub monitored_policies: Vec<PolicyId>,
    /// Where notifications were sent.
    pub destination_url: Option<String>,
}

impl TableDisplay for CycleReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if !self.enabled {
            writeln!(writer, "Failing policies webhook is disabled; nothing to do.")?;
            return Ok(());
        }
        writeln!(writer, "Failing Policies Webhook")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Timestamp:     {}", self.timestamp.to_rfc3339())?;
        if let Some(ref url) = self.destination_url {
            writeln!(writer, "Destination:   {url}")?;
        }
        writeln!(writer, "Policies:      {}", join_ids(&self.monitored_policies))?;
        writeln!(writer, "Status:        ✓ cycle complete")?;
        Ok(())
    }
}

impl TableDisplay for FailingPoliciesPayload {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Policy {}: {}", self.policy.id, self.policy.name)?;
        writeln!(writer, "══════════════════════════════════════════════════")?;
        writeln!(writer, "Purpose:     {}", self.policy.purpose)?;
        if !self.policy.platform.is_empty() {
            writeln!(writer, "Platform:    {}", self.policy.platform)?;
        }
        writeln!(writer, "Timestamp:   {}", self.timestamp.to_rfc3339())?;
        writeln!(writer)?;

        if self.failing_hosts.is_empty() {
            writeln!(writer, "No failing hosts; nothing would be sent.")?;
            return Ok(());
        }

        writeln!(writer, "{:>8}  {:<24}  URL", "HOST ID", "HOSTNAME")?;
        writeln!(writer, "{}", "─".repeat(72))?;
        for host in &self.failing_hosts {
            writeln!(
                writer,
                "{:>8}  {:<24}  {}",
                host.id,
                truncate(&host.hostname, 24),
                host.url
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} host(s)", self.failing_hosts.len())?;
        Ok(())
    }
}

/// One policy's failing set.
#[derive(Debug, Clone, Serialize)]
pub struct FailingSetSummary {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Failing hosts, ordered by identifier.
    pub hosts: Vec<PolicySetHost>,
}

/// Failing sets for display.
#[derive(Debug, Clone, Serialize)]
pub struct FailingSetList {
    /// Sets in ascending policy order.
    pub sets: Vec<FailingSetSummary>,
}

impl TableDisplay for FailingSetList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.sets.iter().all(|s| s.hosts.is_empty()) {
            writeln!(writer, "No failing hosts")?;
            return Ok(());
        }

        writeln!(writer, "{:>8}  {:>8}  HOSTNAME", "POLICY", "HOST ID")?;
        writeln!(writer, "{}", "─".repeat(48))?;
        let mut total = 0usize;
        for set in &self.sets {
            for host in &set.hosts {
                writeln!(writer, "{:>8}  {:>8}  {}", set.policy_id, host.id, host.hostname)?;
                total += 1;
            }
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {total} failing host(s)")?;
        Ok(())
    }
}

/// Result of a failing-set edit.
#[derive(Debug, Clone, Serialize)]
pub struct SetMutation {
    /// What was done.
    pub action: &'static str,
    /// Policy that was edited.
    pub policy_id: PolicyId,
    /// Hosts named in the edit; empty when the whole set was cleared.
    pub hosts: Vec<HostId>,
}

impl TableDisplay for SetMutation {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.hosts.is_empty() {
            writeln!(writer, "✓ {} failing set for policy {}", self.action, self.policy_id)?;
        } else {
            writeln!(
                writer,
                "✓ {} host(s) {} for policy {}",
                self.action,
                join_ids(&self.hosts),
                self.policy_id
            )?;
        }
        Ok(())
    }
}

fn join_ids<T: ToString>(ids: &[T]) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
