//! Ingest workflow
//!
//! One run, in order:
//! 1. Read the source dumps and the program stats file
//! 2. Open (or create) the store
//! 3. Insert placeholder rows up to the authoritative count
//! 4. Update names
//! 5. Classify and write every entry in id-ordered batches

pub mod batch_driver;

pub use batch_driver::{BatchDriver, DriverStats};

use crate::config::IngestConfig;
use crate::db::{insert_placeholder_rows, update_text_column, TextColumn};
use crate::error::Result;
use crate::models::RawFieldTables;
use crate::services::artifact_resolver::ArtifactResolver;
use crate::services::keyword_classifier::KeywordClassifier;
use crate::services::stats_reader::EvalSets;
use seqdb_common::db::init_database;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one ingest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub authoritative_count: usize,
    pub placeholders_inserted: u64,
    pub names_updated: u64,
    pub entries_processed: usize,
    pub batches: usize,
    pub artifacts_found: usize,
    pub derived_formulas: usize,
    /// Pre-existing tags dropped because they are not in the vocabulary
    pub unknown_keywords: usize,
    pub elapsed: Duration,
}

/// Run a full ingest against the configured store
pub async fn run_ingest(config: &IngestConfig) -> Result<RunSummary> {
    let tables = RawFieldTables::load(&config.source_dir, &config.sources)?;
    let eval_sets = EvalSets::load(&config.stats_file, config.stats_columns)?;

    let pool = init_database(&config.database_path, config.keyword_encoding).await?;
    let result = run_with_pool(&pool, config, tables, eval_sets).await;
    pool.close().await;

    result
}

/// Run an ingest against an already initialised store
pub async fn run_with_pool(
    pool: &SqlitePool,
    config: &IngestConfig,
    tables: RawFieldTables,
    eval_sets: EvalSets,
) -> Result<RunSummary> {
    let started = Instant::now();
    let authoritative_count = tables.authoritative_count();

    let placeholders_inserted = insert_placeholder_rows(pool, authoritative_count).await?;
    let names_updated = update_text_column(pool, TextColumn::Name, &tables.names).await?;
    info!(
        authoritative_count,
        placeholders_inserted, names_updated, "Store rows reconciled"
    );

    let classifier = KeywordClassifier::new(
        ArtifactResolver::new(&config.programs_dir),
        Arc::new(eval_sets),
    );
    let driver = BatchDriver::new(
        pool.clone(),
        config.keyword_encoding,
        config.batch_size,
        config.worker_threads,
        Arc::new(classifier),
        Arc::new(tables),
    )?;
    let stats = driver.run(authoritative_count).await?;

    let summary = RunSummary {
        authoritative_count,
        placeholders_inserted,
        names_updated,
        entries_processed: stats.entries_processed,
        batches: stats.batches,
        artifacts_found: stats.artifacts_found,
        derived_formulas: stats.derived_formulas,
        unknown_keywords: stats.unknown_keywords,
        elapsed: started.elapsed(),
    };

    info!(
        entries_processed = summary.entries_processed,
        artifacts_found = summary.artifacts_found,
        derived_formulas = summary.derived_formulas,
        unknown_keywords = summary.unknown_keywords,
        "Ingest completed in {:.1}s",
        summary.elapsed.as_secs_f64()
    );

    Ok(summary)
}
