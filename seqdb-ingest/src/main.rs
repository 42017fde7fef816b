//! seqdb-ingest - incremental keyword index builder
//!
//! Reads the raw field dumps, scans LODA program artifacts, classifies every
//! entry, and writes the results into the SQLite store. Safe to re-run: rows
//! are created once and fields are only ever enriched.

use anyhow::Result;
use clap::Parser;
use seqdb_common::config::TomlConfig;
use seqdb_common::KeywordEncoding;
use seqdb_ingest::{run_ingest, CliOverrides, IngestConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for seqdb-ingest
#[derive(Parser, Debug)]
#[command(name = "seqdb-ingest")]
#[command(about = "Build or update the sequence keyword store")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "SEQDB_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the store and default input locations
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Store file (relative paths are under the data directory)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory containing the field dumps
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// LODA programs checkout
    #[arg(long)]
    programs_dir: Option<PathBuf>,

    /// Program stats CSV
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// Keyword column encoding: bitmask or text
    #[arg(long, env = "SEQDB_KEYWORD_ENCODING")]
    encoding: Option<KeywordEncoding>,

    /// Entries per classify-and-write batch
    #[arg(long, env = "SEQDB_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Classification worker threads (0 = available parallelism)
    #[arg(long, env = "SEQDB_WORKERS")]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is loaded before tracing so its log level can seed the filter
    let toml_config = TomlConfig::load_or_default(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting seqdb-ingest v{} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = CliOverrides {
        data_dir: args.data_dir,
        database: args.database,
        source_dir: args.source_dir,
        programs_dir: args.programs_dir,
        stats_file: args.stats_file,
        keyword_encoding: args.encoding,
        batch_size: args.batch_size,
        worker_threads: args.workers,
    };
    let config = IngestConfig::resolve(&cli, &toml_config)?;
    config.log_summary();

    match run_ingest(&config).await {
        Ok(summary) => {
            info!(
                authoritative_count = summary.authoritative_count,
                placeholders_inserted = summary.placeholders_inserted,
                names_updated = summary.names_updated,
                batches = summary.batches,
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!("Ingest failed: {}", e);
            Err(e.into())
        }
    }
}
