//! Parallel batch driver
//!
//! Walks the authoritative id range in fixed-size batches, in increasing id
//! order. Each batch is classified on a rayon pool (entered through
//! `spawn_blocking` so the tokio runtime is never blocked) and then written
//! as one transaction before the next batch starts. A failure in any worker
//! aborts the run; batches already committed stay durable.

use crate::db::write_classified_batch;
use crate::error::{IngestError, Result};
use crate::models::RawFieldTables;
use crate::services::keyword_classifier::{Classification, KeywordClassifier};
use rayon::prelude::*;
use rayon::ThreadPool;
use seqdb_common::KeywordEncoding;
use sqlx::SqlitePool;
use std::ops::Range;
use std::sync::Arc;

/// Counters accumulated over all batches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub entries_processed: usize,
    pub batches: usize,
    pub artifacts_found: usize,
    pub derived_formulas: usize,
    pub unknown_keywords: usize,
}

impl DriverStats {
    fn record(&mut self, batch: &[Classification]) {
        self.batches += 1;
        self.entries_processed += batch.len();
        self.artifacts_found += batch.iter().filter(|c| c.has_artifact).count();
        self.derived_formulas += batch.iter().filter(|c| c.derived_formula.is_some()).count();
        self.unknown_keywords += batch.iter().map(|c| c.unknown_keywords.len()).sum::<usize>();
    }
}

pub struct BatchDriver {
    pool: SqlitePool,
    encoding: KeywordEncoding,
    batch_size: usize,
    workers: Arc<ThreadPool>,
    classifier: Arc<KeywordClassifier>,
    tables: Arc<RawFieldTables>,
}

impl BatchDriver {
    /// Build a driver with a classification pool of `worker_threads` threads
    pub fn new(
        pool: SqlitePool,
        encoding: KeywordEncoding,
        batch_size: usize,
        worker_threads: usize,
        classifier: Arc<KeywordClassifier>,
        tables: Arc<RawFieldTables>,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(IngestError::Config("batch_size must be at least 1".to_string()));
        }

        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("seqdb-classify-{}", i))
            .build()
            .map_err(|e| IngestError::Worker(format!("Failed to build worker pool: {}", e)))?;

        tracing::debug!(worker_threads, batch_size, "Classification pool ready");

        Ok(Self {
            pool,
            encoding,
            batch_size,
            workers: Arc::new(workers),
            classifier,
            tables,
        })
    }

    /// Classify and write ids `0..count`
    pub async fn run(&self, count: usize) -> Result<DriverStats> {
        let mut stats = DriverStats::default();

        for start in (0..count).step_by(self.batch_size) {
            let end = (start + self.batch_size).min(count);

            tracing::info!(
                first_id = start,
                last_id = end - 1,
                "Processing entries A{:06} to A{:06}",
                start,
                end - 1
            );

            let batch = self.classify_range(start..end).await?;
            write_classified_batch(&self.pool, self.encoding, &batch).await?;
            stats.record(&batch);
        }

        Ok(stats)
    }

    async fn classify_range(&self, ids: Range<usize>) -> Result<Vec<Classification>> {
        let workers = Arc::clone(&self.workers);
        let classifier = Arc::clone(&self.classifier);
        let tables = Arc::clone(&self.tables);

        tokio::task::spawn_blocking(move || {
            workers.install(|| {
                ids.into_par_iter()
                    .map(|id| classifier.classify(&tables.entry(id)))
                    .collect::<Result<Vec<_>>>()
            })
        })
        .await
        .map_err(|e| IngestError::Worker(format!("Classification task failed: {}", e)))?
    }
}
