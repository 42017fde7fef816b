//! Ingest data models

pub mod raw_tables;

pub use raw_tables::{RawEntry, RawFieldTables};
