//! Store models

use crate::codec::{KeywordEncoding, KeywordSet, StoredKeywords};
use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Delimiter of the persisted contributors column
///
/// Names are not escaped, so a name containing a comma (`Doe, Jane`) reads
/// back as two contributors.
pub const CONTRIBUTOR_DELIMITER: char = ',';

/// One persisted sequence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    pub id: i64,
    pub name: String,
    pub keywords: KeywordSet,
    /// First-seen order, not deduplicated
    pub contributors: Vec<String>,
    pub derived_formula: Option<String>,
}

impl SequenceEntry {
    /// Decode a `seq_entries` row written with the given encoding
    pub fn from_row(row: &SqliteRow, encoding: KeywordEncoding) -> Result<Self> {
        let stored = match encoding {
            KeywordEncoding::Bitmask => StoredKeywords::Mask(row.try_get("keywords")?),
            KeywordEncoding::Text => StoredKeywords::Text(row.try_get("keywords")?),
        };
        let contributors: String = row.try_get("contributors")?;
        let derived_formula: String = row.try_get("derived_formula")?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            keywords: KeywordSet::decode(&stored)?,
            contributors: split_contributors(&contributors),
            derived_formula: Some(derived_formula).filter(|f| !f.is_empty()),
        })
    }

    /// `A` number of this entry, e.g. `A000045`
    pub fn a_number(&self) -> String {
        a_number(self.id)
    }
}

/// Format an id as its 6-digit `A` number
pub fn a_number(id: i64) -> String {
    format!("A{:06}", id)
}

/// Join contributors for storage
pub fn join_contributors(contributors: &[String]) -> String {
    contributors.join(&CONTRIBUTOR_DELIMITER.to_string())
}

/// Split a stored contributors column
pub fn split_contributors(stored: &str) -> Vec<String> {
    stored
        .split(CONTRIBUTOR_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
