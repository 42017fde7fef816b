//! Sparse-array dump reader
//!
//! Dumps hold one record per line, `A<id> <payload>`, with a record's payload
//! continued on following lines while the id repeats. Ids increase strictly
//! from one record to the next but may skip values. The result is a dense
//! array indexed by id where absent ids are `None` and present ids carry the
//! payload lines joined with `\n` (an empty payload stays `Some("")`).

use crate::error::{IngestError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense per-id field values
pub type SparseArray = Vec<Option<String>>;

/// Largest id a dump may name (nine digits)
pub const MAX_ENTRY_ID: usize = 999_999_999;

static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A([0-9]{6,})(?: (.*))?$").expect("valid regex"));

/// Read a dump into an array of at least `min_size` slots
///
/// `source_name` labels errors. Blank lines and `#` comments are skipped; any
/// other line that is not `A<digits>[ <payload>]` aborts the read, as does an
/// id lower than the one before it.
pub fn read_sparse_array<R: BufRead>(
    reader: R,
    source_name: &str,
    min_size: usize,
) -> Result<SparseArray> {
    let mut array: SparseArray = vec![None; min_size];
    let mut current: Option<(usize, String)> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let caps = LINE_RE.captures(line).ok_or_else(|| IngestError::SourceFormat {
            source_name: source_name.to_string(),
            line: line_no,
            reason: format!("expected 'A<id> <payload>', got {:?}", truncate(line)),
        })?;
        let id = caps[1]
            .parse::<usize>()
            .ok()
            .filter(|id| *id <= MAX_ENTRY_ID)
            .ok_or_else(|| IngestError::SourceFormat {
                source_name: source_name.to_string(),
                line: line_no,
                reason: format!("id out of range: A{}", truncate(&caps[1])),
            })?;
        let payload = caps.get(2).map_or("", |m| m.as_str());

        if matches!(current, Some((cur, _)) if cur == id) {
            if let Some((_, buf)) = current.as_mut() {
                buf.push('\n');
                buf.push_str(payload);
            }
            continue;
        }

        if let Some((prev, _)) = current {
            if id < prev {
                return Err(IngestError::SourceFormat {
                    source_name: source_name.to_string(),
                    line: line_no,
                    reason: format!("id A{:06} follows A{:06}; ids must increase", id, prev),
                });
            }
        }

        if let Some((prev, buf)) = current.take() {
            store(&mut array, prev, buf, source_name)?;
        }
        current = Some((id, payload.to_string()));
    }

    if let Some((prev, buf)) = current {
        store(&mut array, prev, buf, source_name)?;
    }

    Ok(array)
}

/// Open and read a dump file
pub fn read_sparse_file(path: &Path, min_size: usize) -> Result<SparseArray> {
    let file = File::open(path)?;
    let source_name = path.display().to_string();
    read_sparse_array(BufReader::new(file), &source_name, min_size)
}

fn store(array: &mut SparseArray, id: usize, payload: String, source_name: &str) -> Result<()> {
    if id >= array.len() {
        let len = id.checked_add(1).ok_or_else(|| IngestError::SourceFormat {
            source_name: source_name.to_string(),
            line: 0,
            reason: format!("id A{} does not fit in memory", id),
        })?;
        array.resize(len, None);
    }
    array[id] = Some(payload);
    Ok(())
}

fn truncate(line: &str) -> String {
    line.chars().take(40).collect()
}
