//! On-disk fixtures: source dumps, LODA artifacts, and a stats file in a temp dir

#![allow(dead_code)]

use seqdb_common::config::{SourceFiles, StatsColumns};
use seqdb_common::KeywordEncoding;
use seqdb_ingest::IngestConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp directory laid out like a data directory
///
/// Keep the fixture alive for the duration of the test.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("oeis")).unwrap();
        std::fs::create_dir_all(dir.path().join("loda-programs").join("oeis")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a dump file (`names`, `keywords`, ...) into the source directory
    pub fn write_dump(&self, name: &str, content: &str) {
        std::fs::write(self.path().join("oeis").join(name), content).unwrap();
    }

    /// Write a LODA artifact for an id
    pub fn write_artifact(&self, id: usize, content: &str) -> PathBuf {
        let path = self
            .path()
            .join("loda-programs")
            .join("oeis")
            .join(format!("{:03}", id / 1000))
            .join(format!("A{:06}.asm", id));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn write_stats(&self, content: &str) {
        let dir = self.path().join("loda-stats");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("programs.csv"), content).unwrap();
    }

    /// Dumps modelled on A000037, A000096 and A000098
    pub fn write_sample_dumps(&self) {
        self.write_dump(
            "names",
            "A000037 Numbers that are not squares (or, the nonsquares).\n\
             A000096 a(n) = n*(n+3)/2.\n\
             A000098 Number of partitions of n if there are two kinds of 1, two kinds of 2 and two kinds of 3.\n",
        );
        self.write_dump(
            "authors",
            "A000037 _N. J. A. Sloane_\n\
             A000096 _N. J. A. Sloane_, _Simon Plouffe_\n\
             A000098 _N. J. A. Sloane_\n",
        );
        self.write_dump(
            "formulas",
            "A000037 a(n) = n + floor(1/2 + sqrt(n)).\n\
             A000096 G.f.: x*(2-x)/(1-x)^3.\n\
             A000096 E.g.f.: exp(x)*(2*x+x^2)/2.\n\
             A000098 G.f.: 1/((1-x)^2*(1-x^2)^2*(1-x^3)^2*Product_{k>=4} (1-x^k)).\n",
        );
        self.write_dump(
            "comments",
            "A000098 It appears that a(n) is odd infinitely often.\n",
        );
        self.write_dump(
            "keywords",
            "A000037 nonn,easy,nice\n\
             A000096 nonn,easy,changed\n\
             A000098 nonn\n",
        );
        self.write_dump(
            "programs",
            "A000037 (PARI) a(n)=n+(1+sqrtint(4*n))\\2\n\
             A000096 (Mathematica) Table[n (n + 3)/2, {n, 0, 60}]\n",
        );
    }
}

/// Ingest config rooted at the fixture, with a small batch size
pub fn test_config(fixture: &Fixture, encoding: KeywordEncoding) -> IngestConfig {
    let root = fixture.path();
    IngestConfig {
        data_dir: root.to_path_buf(),
        database_path: root.join("seqs.sqlite3"),
        source_dir: root.join("oeis"),
        programs_dir: root.join("loda-programs"),
        stats_file: root.join("loda-stats").join("programs.csv"),
        keyword_encoding: encoding,
        batch_size: 16,
        worker_threads: 2,
        log_level: "debug".to_string(),
        stats_columns: StatsColumns::default(),
        sources: SourceFiles::default(),
    }
}
