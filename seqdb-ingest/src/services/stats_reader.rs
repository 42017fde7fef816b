//! Program statistics reader
//!
//! Reads the CSV-like stats file that flags which ids have incrementally
//! evaluable and logarithmic-complexity programs. Rows whose first field is
//! not a numeric id are skipped; a header row naming the flag columns
//! overrides the configured positions.

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord, Trim};
use seqdb_common::config::StatsColumns;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const INCEVAL_HEADERS: [&str; 2] = ["inc_eval", "inceval"];
const LOGEVAL_HEADERS: [&str; 2] = ["log_eval", "logeval"];

/// Read-only id sets consumed by the classifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalSets {
    inceval: HashSet<usize>,
    logeval: HashSet<usize>,
}

impl EvalSets {
    pub fn new(inceval: HashSet<usize>, logeval: HashSet<usize>) -> Self {
        Self { inceval, logeval }
    }

    pub fn is_inceval(&self, id: usize) -> bool {
        self.inceval.contains(&id)
    }

    pub fn is_logeval(&self, id: usize) -> bool {
        self.logeval.contains(&id)
    }

    pub fn inceval_count(&self) -> usize {
        self.inceval.len()
    }

    pub fn logeval_count(&self) -> usize {
        self.logeval.len()
    }

    /// Parse stats rows from a reader
    pub fn read<R: Read>(reader: R, columns: StatsColumns) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut columns = columns;
        let mut sets = EvalSets::default();

        for result in rdr.records() {
            let record = result?;
            let Some(id) = record.get(0).and_then(parse_id) else {
                apply_header(&record, &mut columns);
                continue;
            };
            if flag_set(&record, columns.inceval_column) {
                sets.inceval.insert(id);
            }
            if flag_set(&record, columns.logeval_column) {
                sets.logeval.insert(id);
            }
        }

        Ok(sets)
    }

    /// Load the stats file; a missing file yields empty sets
    pub fn load(path: &Path, columns: StatsColumns) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Stats file not found: {} (no loda-inceval/loda-logeval tags this run)",
                path.display()
            );
            return Ok(Self::default());
        }
        let file = std::fs::File::open(path)?;
        let sets = Self::read(file, columns)?;
        debug!(
            inceval = sets.inceval_count(),
            logeval = sets.logeval_count(),
            "Loaded program stats from {}",
            path.display()
        );
        Ok(sets)
    }
}

fn parse_id(field: &str) -> Option<usize> {
    field.strip_prefix('A').unwrap_or(field).parse().ok()
}

fn flag_set(record: &StringRecord, column: usize) -> bool {
    record.get(column) == Some("1")
}

fn apply_header(record: &StringRecord, columns: &mut StatsColumns) {
    for (idx, field) in record.iter().enumerate() {
        let field = field.to_lowercase();
        if INCEVAL_HEADERS.contains(&field.as_str()) {
            columns.inceval_column = idx;
        } else if LOGEVAL_HEADERS.contains(&field.as_str()) {
            columns.logeval_column = idx;
        }
    }
}
