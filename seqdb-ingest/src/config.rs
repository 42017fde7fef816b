//! Configuration resolution for seqdb-ingest
//!
//! **Priority:** command line → environment → TOML → compiled default

use crate::error::{IngestError, Result};
use seqdb_common::config::{
    default_data_dir, resolve_path, SourceFiles, StatsColumns, TomlConfig, DATA_DIR_ENV_VAR,
    DEFAULT_DATABASE_FILE,
};
use seqdb_common::KeywordEncoding;
use std::path::PathBuf;
use tracing::info;

pub const DATABASE_ENV_VAR: &str = "SEQDB_DATABASE";
pub const SOURCE_DIR_ENV_VAR: &str = "SEQDB_SOURCE_DIR";
pub const PROGRAMS_DIR_ENV_VAR: &str = "SEQDB_PROGRAMS_DIR";
pub const STATS_FILE_ENV_VAR: &str = "SEQDB_STATS_FILE";

/// Default number of entries per classify-and-write batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Values given on the command line (environment-backed ones are already merged by clap)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub programs_dir: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub keyword_encoding: Option<KeywordEncoding>,
    pub batch_size: Option<usize>,
    pub worker_threads: Option<usize>,
}

/// Fully resolved settings of one ingest run
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub source_dir: PathBuf,
    pub programs_dir: PathBuf,
    pub stats_file: PathBuf,
    pub keyword_encoding: KeywordEncoding,
    pub batch_size: usize,
    pub worker_threads: usize,
    pub log_level: String,
    pub stats_columns: StatsColumns,
    pub sources: SourceFiles,
}

impl IngestConfig {
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let data_dir = resolve_path(
            cli.data_dir.as_deref(),
            DATA_DIR_ENV_VAR,
            toml.data_dir.as_deref(),
            default_data_dir,
        );

        let database = resolve_path(
            cli.database.as_deref(),
            DATABASE_ENV_VAR,
            toml.database.as_deref(),
            || PathBuf::from(DEFAULT_DATABASE_FILE),
        );
        let database_path = if database.is_absolute() {
            database
        } else {
            data_dir.join(database)
        };

        let source_dir = resolve_path(
            cli.source_dir.as_deref(),
            SOURCE_DIR_ENV_VAR,
            toml.source_dir.as_deref(),
            || data_dir.join("oeis"),
        );
        let programs_dir = resolve_path(
            cli.programs_dir.as_deref(),
            PROGRAMS_DIR_ENV_VAR,
            toml.programs_dir.as_deref(),
            || data_dir.join("loda-programs"),
        );
        let stats_file = resolve_path(
            cli.stats_file.as_deref(),
            STATS_FILE_ENV_VAR,
            toml.stats_file.as_deref(),
            || data_dir.join("loda-stats").join("programs.csv"),
        );

        let batch_size = cli
            .batch_size
            .or(toml.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(IngestError::Config("batch_size must be at least 1".to_string()));
        }

        let worker_threads = match cli.worker_threads.or(toml.worker_threads) {
            Some(n) if n > 0 => n,
            _ => num_cpus::get(),
        };

        Ok(Self {
            data_dir,
            database_path,
            source_dir,
            programs_dir,
            stats_file,
            keyword_encoding: cli.keyword_encoding.unwrap_or(toml.keyword_encoding),
            batch_size,
            worker_threads,
            log_level: toml.logging.level.clone(),
            stats_columns: toml.stats,
            sources: toml.sources.clone(),
        })
    }

    pub fn log_summary(&self) {
        info!("Database: {}", self.database_path.display());
        info!("Source dumps: {}", self.source_dir.display());
        info!("Programs: {}", self.programs_dir.display());
        info!("Stats file: {}", self.stats_file.display());
        info!(
            encoding = %self.keyword_encoding,
            batch_size = self.batch_size,
            worker_threads = self.worker_threads,
            "Ingest settings"
        );
    }
}
