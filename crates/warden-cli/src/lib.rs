//! # warden-cli
//!
//! Warden command-line interface.
//!
//! Provides commands for:
//! - Running one failing-policy webhook cycle (`warden trigger`)
//! - Previewing the payload for a policy (`warden preview`)
//! - Inspecting and editing failing-policy sets (`warden failing ...`)
//!
//! Every command works on three files: the application configuration, the
//! policy catalog and the failing-set state. Their paths come from flags or
//! the `WARDEN_CONFIG`, `WARDEN_POLICIES` and `WARDEN_STATE` environment
//! variables.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, FailingCommands, Format, TriggerArgs};
pub use error::CliError;
pub use output::OutputFormat;
