//! Compliance policy records and catalog access for Warden.
//!
//! `warden-policy` holds the types shared by the failing-policy tracker and
//! the webhook engine: policy and host identifiers, the [`Policy`] record that
//! is forwarded to webhook consumers, and the [`PolicyCatalog`] trait used to
//! resolve policies by identifier.
//!
//! # Example
//!
//! ```rust
//! use warden_policy::{MemoryPolicyCatalog, Policy, PolicyId, PolicyPurpose};
//!
//! let catalog = MemoryPolicyCatalog::new();
//! catalog.insert(
//!     Policy::new(PolicyId::new(7), "Disk encryption enabled", "SELECT 1 FROM disk_encryption WHERE encrypted = 1;")
//!         .with_purpose(PolicyPurpose::Critical),
//! );
//! assert_eq!(catalog.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{JsonFilePolicyCatalog, MemoryPolicyCatalog, PolicyCatalog};
pub use error::{CatalogError, Result};
pub use types::{HostId, Policy, PolicyId, PolicyPurpose, PolicySetHost};
