//! Incremental writes to the entries table
//!
//! Rows are created once, as placeholders, and then only enriched: a fresh
//! value that is empty never replaces a stored one. All writes are grouped
//! into transactions of at most [`UPDATE_BATCH_SIZE`] statements.

use crate::error::Result;
use crate::services::keyword_classifier::Classification;
use crate::services::sparse_reader::SparseArray;
use seqdb_common::db::{join_contributors, ENTRIES_TABLE};
use seqdb_common::{KeywordEncoding, StoredKeywords};
use sqlx::SqlitePool;
use tracing::debug;

/// Statements per write transaction
pub const UPDATE_BATCH_SIZE: usize = 1000;

/// Text columns that can be updated from a dense fresh-value array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    Name,
    Contributors,
    DerivedFormula,
}

impl TextColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            TextColumn::Name => "name",
            TextColumn::Contributors => "contributors",
            TextColumn::DerivedFormula => "derived_formula",
        }
    }
}

/// Highest id in the store, `None` when empty
pub async fn max_entry_id(pool: &SqlitePool) -> Result<Option<i64>> {
    let sql = format!("SELECT MAX(id) FROM {}", ENTRIES_TABLE);
    let max: Option<i64> = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(max)
}

/// Insert empty rows for every id between the store's max id and `authoritative_count`
///
/// Returns the number of rows inserted.
pub async fn insert_placeholder_rows(pool: &SqlitePool, authoritative_count: usize) -> Result<u64> {
    let current_max = max_entry_id(pool).await?.unwrap_or(-1);
    let first = current_max + 1;
    let end = authoritative_count as i64;
    if first >= end {
        debug!(current_max, authoritative_count, "No placeholder rows needed");
        return Ok(0);
    }

    let sql = format!("INSERT OR IGNORE INTO {} (id) VALUES (?)", ENTRIES_TABLE);
    let ids: Vec<i64> = (first..end).collect();
    let mut inserted = 0;

    for chunk in ids.chunks(UPDATE_BATCH_SIZE) {
        let mut tx = pool.begin().await?;
        for id in chunk {
            inserted += sqlx::query(&sql).bind(*id).execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
    }

    debug!(
        first_id = first,
        last_id = end - 1,
        inserted,
        "Inserted placeholder rows"
    );

    Ok(inserted)
}

/// Write non-empty fresh values of one text column; returns how many were written
pub async fn update_text_column(
    pool: &SqlitePool,
    column: TextColumn,
    fresh: &SparseArray,
) -> Result<u64> {
    let sql = format!("UPDATE {} SET {} = ? WHERE id = ?", ENTRIES_TABLE, column.as_str());
    let updates: Vec<(i64, &str)> = fresh
        .iter()
        .enumerate()
        .filter_map(|(id, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some((id as i64, v)),
            _ => None,
        })
        .collect();

    let mut written = 0;
    for chunk in updates.chunks(UPDATE_BATCH_SIZE) {
        let mut tx = pool.begin().await?;
        for (id, value) in chunk {
            written += sqlx::query(&sql)
                .bind(*value)
                .bind(*id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
    }

    debug!(column = column.as_str(), written, "Updated text column");

    Ok(written)
}

/// Upsert one batch of classifications in a single transaction
///
/// Each column keeps its stored value when the fresh value is empty.
pub async fn write_classified_batch(
    pool: &SqlitePool,
    encoding: KeywordEncoding,
    batch: &[Classification],
) -> Result<()> {
    let empty_keywords = encoding.empty_literal();
    let sql = format!(
        r#"
        INSERT INTO {table} (id, keywords, contributors, derived_formula)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            keywords = CASE WHEN excluded.keywords <> {empty} THEN excluded.keywords ELSE {table}.keywords END,
            contributors = CASE WHEN excluded.contributors <> '' THEN excluded.contributors ELSE {table}.contributors END,
            derived_formula = CASE WHEN excluded.derived_formula <> '' THEN excluded.derived_formula ELSE {table}.derived_formula END
        "#,
        table = ENTRIES_TABLE,
        empty = empty_keywords,
    );

    let mut tx = pool.begin().await?;
    for c in batch {
        let query = sqlx::query(&sql).bind(c.id as i64);
        let query = match c.keywords.encode(encoding) {
            StoredKeywords::Mask(mask) => query.bind(mask),
            StoredKeywords::Text(text) => query.bind(text),
        };
        query
            .bind(join_contributors(&c.contributors))
            .bind(c.derived_formula.clone().unwrap_or_default())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(())
}
