//! Store initialization
//!
//! One table, `seq_entries`, keyed by entry id. The `keywords` column type
//! follows the configured [`KeywordEncoding`]; an existing store written with
//! the other encoding is refused rather than reinterpreted.

use crate::codec::KeywordEncoding;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Name of the entries table
pub const ENTRIES_TABLE: &str = "seq_entries";

/// SQLite busy timeout for writer and readers
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (creating if needed) the writable store
///
/// The pool holds a single connection: the ingest run is the only writer.
pub async fn init_database(db_path: &Path, encoding: KeywordEncoding) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets external read-only connections observe committed batches mid-run
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool, encoding).await?;

    Ok(pool)
}

/// Create the entries table if missing and check its keyword column encoding
pub async fn init_schema(pool: &SqlitePool, encoding: KeywordEncoding) -> Result<()> {
    create_entries_table(pool, encoding).await?;
    verify_keyword_encoding(pool, encoding).await
}

async fn create_entries_table(pool: &SqlitePool, encoding: KeywordEncoding) -> Result<()> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            keywords {keyword_type} NOT NULL DEFAULT {empty},
            contributors TEXT NOT NULL DEFAULT '',
            derived_formula TEXT NOT NULL DEFAULT ''
        )
        "#,
        table = ENTRIES_TABLE,
        keyword_type = encoding.column_type(),
        empty = encoding.empty_literal(),
    );

    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

/// Refuse a store whose keyword column was created for the other encoding
pub async fn verify_keyword_encoding(pool: &SqlitePool, encoding: KeywordEncoding) -> Result<()> {
    let column_type: Option<String> = sqlx::query_scalar(
        "SELECT type FROM pragma_table_info('seq_entries') WHERE name = 'keywords'",
    )
    .fetch_optional(pool)
    .await?;

    match column_type {
        Some(actual) if actual.eq_ignore_ascii_case(encoding.column_type()) => Ok(()),
        Some(actual) => Err(Error::Config(format!(
            "Store keyword column is {} but configured encoding is {} ({})",
            actual,
            encoding,
            encoding.column_type()
        ))),
        None => Err(Error::Config(format!(
            "Table {} has no keywords column",
            ENTRIES_TABLE
        ))),
    }
}

/// Connect to an existing store in read-only mode
///
/// Not `immutable`: the writer may be mid-run, and readers must see its commits.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Database not found: {}",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_schema_columns() {
        let pool = memory_pool().await;
        init_schema(&pool, KeywordEncoding::Bitmask).await.unwrap();

        let columns: Vec<(String, String)> =
            sqlx::query_as("SELECT name, type FROM pragma_table_info('seq_entries') ORDER BY cid")
                .fetch_all(&pool)
                .await
                .unwrap();
        let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["id", "name", "keywords", "contributors", "derived_formula"]);
        assert_eq!(columns[2].1, "INTEGER");
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = memory_pool().await;
        init_schema(&pool, KeywordEncoding::Text).await.unwrap();
        init_schema(&pool, KeywordEncoding::Text).await.unwrap();
    }

    #[tokio::test]
    async fn test_encoding_mismatch_refused() {
        let pool = memory_pool().await;
        init_schema(&pool, KeywordEncoding::Text).await.unwrap();
        let err = init_schema(&pool, KeywordEncoding::Bitmask).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_readonly_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = connect_readonly(&dir.path().join("missing.sqlite3")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
