//! Ingest services: source reading, artifact scanning, classification

pub mod artifact_resolver;
pub mod keyword_classifier;
pub mod sparse_reader;
pub mod stats_reader;

pub use artifact_resolver::{ArtifactResolver, ArtifactScan};
pub use keyword_classifier::{Classification, FactSheet, KeywordClassifier};
pub use sparse_reader::{read_sparse_array, read_sparse_file, SparseArray};
pub use stats_reader::EvalSets;
