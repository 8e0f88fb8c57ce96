//! End-to-end tests for Warden.
//!
//! These tests drive a full webhook cycle across crates:
//! - JSON-file policy catalog and failing-set store
//! - HTTP delivery to a local webhook receiver
//! - Pruning and durability of failing sets across store reopen

#![cfg(test)]
