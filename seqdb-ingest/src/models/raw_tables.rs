//! Raw per-field tables assembled from the source dumps

use crate::error::{IngestError, Result};
use crate::services::sparse_reader::{read_sparse_file, SparseArray};
use seqdb_common::config::SourceFiles;
use std::path::Path;
use tracing::{info, warn};

/// One sparse array per source field, indexed by id
#[derive(Debug, Clone, Default)]
pub struct RawFieldTables {
    pub names: SparseArray,
    pub authors: SparseArray,
    pub comments: SparseArray,
    pub formulas: SparseArray,
    pub keywords: SparseArray,
    pub programs: SparseArray,
}

/// Borrowed view of one entry's raw fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'a> {
    pub id: usize,
    pub name: Option<&'a str>,
    pub author: Option<&'a str>,
    pub comments: Option<&'a str>,
    pub formulas: Option<&'a str>,
    pub keywords: Option<&'a str>,
    pub programs: Option<&'a str>,
}

impl RawEntry<'_> {
    /// An entry with no data in any field
    pub fn empty(id: usize) -> Self {
        Self {
            id,
            name: None,
            author: None,
            comments: None,
            formulas: None,
            keywords: None,
            programs: None,
        }
    }
}

impl RawFieldTables {
    /// Read all dumps from `source_dir`
    ///
    /// The names dump is required and fixes the authoritative count. Other
    /// dumps are optional; a missing one is read as all-absent.
    pub fn load(source_dir: &Path, files: &SourceFiles) -> Result<Self> {
        let names_path = source_dir.join(&files.names);
        if !names_path.exists() {
            return Err(IngestError::Config(format!(
                "Names dump not found: {}",
                names_path.display()
            )));
        }
        let names = read_sparse_file(&names_path, 0)?;
        let min_size = names.len();

        let tables = Self {
            authors: load_optional(source_dir, &files.authors, min_size)?,
            comments: load_optional(source_dir, &files.comments, min_size)?,
            formulas: load_optional(source_dir, &files.formulas, min_size)?,
            keywords: load_optional(source_dir, &files.keywords, min_size)?,
            programs: load_optional(source_dir, &files.programs, min_size)?,
            names,
        };

        info!(
            authoritative_count = tables.authoritative_count(),
            "Loaded source dumps from {}",
            source_dir.display()
        );

        Ok(tables)
    }

    /// Number of ids the names dump covers (max name id + 1)
    pub fn authoritative_count(&self) -> usize {
        self.names.len()
    }

    pub fn entry(&self, id: usize) -> RawEntry<'_> {
        RawEntry {
            id,
            name: field(&self.names, id),
            author: field(&self.authors, id),
            comments: field(&self.comments, id),
            formulas: field(&self.formulas, id),
            keywords: field(&self.keywords, id),
            programs: field(&self.programs, id),
        }
    }
}

fn field(array: &SparseArray, id: usize) -> Option<&str> {
    array.get(id).and_then(|v| v.as_deref())
}

fn load_optional(source_dir: &Path, file_name: &str, min_size: usize) -> Result<SparseArray> {
    let path = source_dir.join(file_name);
    if !path.exists() {
        warn!("Source dump not found, treating as empty: {}", path.display());
        return Ok(vec![None; min_size]);
    }
    read_sparse_file(&path, min_size)
}
