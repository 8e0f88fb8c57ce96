//! Configuration snapshot consumed by each webhook cycle.
//!
//! The configuration store owns these settings; a cycle receives an
//! immutable [`AppConfig`] and never reads ambient global state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use warden_policy::{HostId, PolicyId};

use crate::error::ConfigError;

/// Default delivery timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server settings.
    #[serde(default)]
    pub server_settings: ServerSettings,
    /// Webhook settings.
    #[serde(default)]
    pub webhook_settings: WebhookSettings,
    /// HTTP client settings used for delivery.
    #[serde(default)]
    pub transport: TransportSettings,
}

impl AppConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. The result is
    /// not validated; call [`validate`](Self::validate) for that.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Checks the settings a cycle depends on.
    ///
    /// A disabled webhook is always valid: nothing else is consulted.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let webhook = &self.webhook_settings.failing_policies_webhook;
        if !webhook.enable_failing_policies_webhook {
            return Ok(());
        }
        self.server_settings.server_url()?;
        webhook.destination_url()?;
        webhook.timeout()?;
        Ok(())
    }
}

/// Server-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Public base address of the server, used to build host links.
    #[serde(default)]
    pub server_url: String,
}

impl ServerSettings {
    /// Parses the server base address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not an absolute http(s) URL.
    pub fn server_url(&self) -> Result<ServerUrl, ConfigError> {
        ServerUrl::parse(&self.server_url)
    }
}

/// Webhook settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Failing-policy webhook.
    #[serde(default)]
    pub failing_policies_webhook: FailingPoliciesWebhookSettings,
}

/// Settings for the failing-policy webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailingPoliciesWebhookSettings {
    /// Whether the webhook runs at all.
    #[serde(default)]
    pub enable_failing_policies_webhook: bool,
    /// Where notifications are POSTed.
    #[serde(default)]
    pub destination_url: String,
    /// Monitored policies, processed in this order.
    #[serde(default)]
    pub policy_ids: Vec<PolicyId>,
    /// Per-delivery timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for FailingPoliciesWebhookSettings {
    fn default() -> Self {
        Self {
            enable_failing_policies_webhook: false,
            destination_url: String::new(),
            policy_ids: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FailingPoliciesWebhookSettings {
    /// Creates enabled settings for the given destination and policies.
    #[must_use]
    pub fn enabled(destination_url: impl Into<String>, policy_ids: Vec<PolicyId>) -> Self {
        Self {
            enable_failing_policies_webhook: true,
            destination_url: destination_url.into(),
            policy_ids,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the delivery timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Parses the destination URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is not an absolute http(s) URL.
    pub fn destination_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("destination_url", &self.destination_url)
    }

    /// Returns the delivery timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is zero.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

/// TLS options for the delivery client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Accept any server certificate. Only for testing.
    #[serde(default)]
    pub tls_skip_verify: bool,
    /// Extra PEM root certificate(s) to trust.
    #[serde(default)]
    pub root_ca: Option<PathBuf>,
}

/// Validated server base address.
///
/// Stored without a trailing slash so host links are always
/// `<base>/hosts/<id>`, whatever form the operator configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerUrl(String);

impl ServerUrl {
    /// Parses and normalizes a server base address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not an absolute http(s) URL, or if
    /// it carries a query or fragment.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let url = parse_http_url("server_url", value)?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::InvalidUrl {
                field: "server_url",
                value: value.to_string(),
                reason: "must not contain a query or fragment".to_string(),
            });
        }
        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    /// Returns the normalized base address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the deep link to a host's page.
    #[must_use]
    pub fn host_url(&self, host_id: HostId) -> String {
        format!("{}/hosts/{host_id}", self.0)
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("must not be empty".to_string()));
    }
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
