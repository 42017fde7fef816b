//! Program artifact resolver
//!
//! Each id may have an externally maintained LODA program at
//! `<programs_dir>/oeis/<id div 1000, 3 digits>/A<id, 6 digits>.asm`.
//! A missing file is the normal case for most ids and is not an error.

use crate::error::{IngestError, Result};
use seqdb_common::{Keyword, KeywordSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Artifact file extension
pub const ARTIFACT_EXTENSION: &str = "asm";

/// Subdirectory of the programs checkout holding the bucketed artifacts
pub const ARTIFACT_SUBDIR: &str = "oeis";

/// Line prefix naming a contributor
pub const SUBMITTED_BY_MARKER: &str = "; Submitted by ";

/// Line prefix carrying a derived formula
pub const FORMULA_MARKER: &str = "; Formula:";

/// Loop-opening instruction
pub const LOOP_TOKEN: &str = "lpb";

/// Locates and scans program artifacts; holds only an immutable root path
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    root: PathBuf,
}

impl ArtifactResolver {
    pub fn new(programs_dir: &Path) -> Self {
        Self {
            root: programs_dir.join(ARTIFACT_SUBDIR),
        }
    }

    /// Deterministic artifact path for an id
    pub fn artifact_path(&self, id: usize) -> PathBuf {
        self.root
            .join(format!("{:03}", id / 1000))
            .join(format!("A{:06}.{}", id, ARTIFACT_EXTENSION))
    }

    /// Artifact lines, or `None` when no artifact exists
    pub fn read_lines(&self, id: usize) -> Result<Option<Vec<String>>> {
        let path = self.artifact_path(id);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content.lines().map(str::to_string).collect())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(IngestError::Artifact { path, source }),
        }
    }

    /// Scan the artifact for an id, if present
    pub fn resolve(&self, id: usize) -> Result<Option<ArtifactScan>> {
        Ok(self.read_lines(id)?.map(|lines| ArtifactScan::scan(&lines)))
    }
}

/// Annotations found in one artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactScan {
    /// `; Submitted by` names in file order
    pub contributors: Vec<String>,
    /// First non-empty `; Formula:` snippet
    pub derived_formula: Option<String>,
    /// Some line opens a loop
    pub has_loop: bool,
}

impl ArtifactScan {
    pub fn scan<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut scan = ArtifactScan::default();

        for line in lines {
            let line = line.as_ref();
            if let Some(rest) = line.strip_prefix(SUBMITTED_BY_MARKER) {
                let name = rest.trim();
                if !name.is_empty() {
                    scan.contributors.push(name.to_string());
                }
            } else if line.starts_with(FORMULA_MARKER) {
                if scan.derived_formula.is_none() {
                    scan.derived_formula = line
                        .split_once(':')
                        .map(|(_, formula)| formula.trim().to_string())
                        .filter(|f| !f.is_empty());
                }
            } else if line.trim_start().starts_with(LOOP_TOKEN) {
                scan.has_loop = true;
            }
        }

        scan
    }

    /// Keywords signalled by the artifact: `loda` always, plus formula/loop tags
    pub fn signals(&self) -> KeywordSet {
        let mut set = KeywordSet::new();
        set.insert(Keyword::Loda);
        if self.derived_formula.is_some() {
            set.insert(Keyword::LodaFormula);
        }
        if self.has_loop {
            set.insert(Keyword::LodaLoop);
        }
        set
    }
}
