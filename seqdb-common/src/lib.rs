//! # seqdb Common Library
//!
//! Shared code for the seqdb ingest pipeline and its readers:
//! - Keyword vocabulary and the bitmask/text codecs
//! - Sequence entry model
//! - Store initialization and the read-only query surface
//! - Configuration loading

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod keywords;

pub use codec::{KeywordEncoding, KeywordSet, StoredKeywords};
pub use error::{Error, Result};
pub use keywords::Keyword;
