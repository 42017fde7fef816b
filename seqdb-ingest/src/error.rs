//! Error types for seqdb-ingest
//!
//! Every variant is fatal to the run. A missing artifact file is not an error
//! and never reaches this type.

use std::path::PathBuf;
use thiserror::Error;

/// Ingest error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// A dump line violates the `A<id> <payload>` shape
    #[error("Source format error in {source_name} line {line}: {reason}")]
    SourceFormat {
        source_name: String,
        line: usize,
        reason: String,
    },

    /// Store connection or write failure
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// seqdb-common error
    #[error("Common error: {0}")]
    Common(#[from] seqdb_common::Error),

    /// IO error while reading inputs
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed stats file
    #[error("Stats file error: {0}")]
    Csv(#[from] csv::Error),

    /// Artifact exists but could not be read
    #[error("Artifact read failed for {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Classification worker failed or panicked
    #[error("Worker failure: {0}")]
    Worker(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;
