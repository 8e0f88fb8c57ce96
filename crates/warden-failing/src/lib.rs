//! # warden-failing
//!
//! Registry of hosts currently failing each compliance policy.
//!
//! The policy evaluation workers call [`FailingPolicySet::add_host`] whenever
//! a host fails a policy; the webhook trigger snapshots a policy's members
//! with [`FailingPolicySet::list_hosts`] and, once the notification has been
//! delivered, removes exactly that snapshot with
//! [`FailingPolicySet::remove_hosts`]. Hosts that fail after the snapshot are
//! left in place for the next cycle.
//!
//! Backends:
//!
//! - [`MemoryFailingPolicySet`]: in-process, lock-protected
//! - [`JsonFileFailingPolicySet`]: write-through JSON file, survives restarts
//!
//! ## Example
//!
//! ```rust
//! use warden_failing::{FailingPolicySet, MemoryFailingPolicySet};
//! use warden_policy::{PolicyId, PolicySetHost};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let set = MemoryFailingPolicySet::new();
//! let policy = PolicyId::new(7);
//! set.add_host(policy, PolicySetHost::new(101, "alice-laptop")).await.unwrap();
//!
//! let snapshot = set.list_hosts(policy).await.unwrap();
//! set.remove_hosts(policy, &snapshot).await.unwrap();
//! assert!(set.list_hosts(policy).await.unwrap().is_empty());
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod memory;
mod state;
pub mod traits;

pub use error::{FailingSetError, Result};
pub use file::JsonFileFailingPolicySet;
pub use memory::MemoryFailingPolicySet;
pub use traits::FailingPolicySet;
