//! seqdb-ingest library
//!
//! Builds and incrementally maintains the sequence keyword store from raw
//! field dumps, LODA program artifacts, and program stats. The binary in
//! `main.rs` is a thin wrapper around [`workflow::run_ingest`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use config::{CliOverrides, IngestConfig};
pub use error::{IngestError, Result};
pub use workflow::{run_ingest, run_with_pool, RunSummary};
