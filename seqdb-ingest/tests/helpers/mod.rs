//! Test helper utilities
//!
//! Shared fixtures for seqdb-ingest integration tests

pub mod fixtures;

pub use fixtures::{test_config, Fixture};
