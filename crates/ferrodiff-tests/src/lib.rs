//! ferrodiff testing suite
//!
//! Shared fixtures for building directory trees on disk, plus end-to-end
//! tests that scan, compare, sync and deduplicate real trees.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Tree and file builders used by the integration tests.
pub mod test_utils;

pub use test_utils::{generate_test_data, scan_roots, TestDataPattern, TreeBuilder};
