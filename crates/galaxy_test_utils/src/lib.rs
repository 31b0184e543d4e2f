//! # Galaxy Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture builders for sessions, configs and catalogs
//! - Scripted headless scenarios with a proximity contact check
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod scenario;

/// Re-export proptest for convenience.
pub use proptest;
