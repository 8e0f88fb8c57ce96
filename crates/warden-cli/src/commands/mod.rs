//! CLI command implementations.
//!
//! - [`trigger`] - Run one failing-policy webhook cycle
//! - [`preview`] - Show the payload for one policy without sending it
//! - [`failing`] - Inspect and edit failing-policy sets

pub mod failing;
pub mod preview;
pub mod trigger;

pub use failing::FailingCommand;
pub use preview::PreviewCommand;
pub use trigger::TriggerCommand;
