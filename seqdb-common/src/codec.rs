//! Keyword set codecs
//!
//! Two encodings are supported for the persisted `keywords` column:
//! - **Bitmask** (default): one bit per vocabulary position. Membership filters
//!   collapse into a single integer comparison per row.
//! - **Text** (legacy): sorted identifiers joined by `,`. Membership is a
//!   substring match, which false-positives whenever one identifier is a
//!   substring of another (`loda` inside `loda-loop`).

use crate::keywords::Keyword;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Delimiter for the text encoding
pub const TEXT_DELIMITER: char = ',';

/// Storage encoding of the keyword column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordEncoding {
    #[default]
    Bitmask,
    Text,
}

impl KeywordEncoding {
    /// SQL column type for the keyword column
    pub fn column_type(self) -> &'static str {
        match self {
            KeywordEncoding::Bitmask => "INTEGER",
            KeywordEncoding::Text => "TEXT",
        }
    }

    /// SQL literal of an empty keyword set
    pub fn empty_literal(self) -> &'static str {
        match self {
            KeywordEncoding::Bitmask => "0",
            KeywordEncoding::Text => "''",
        }
    }
}

impl fmt::Display for KeywordEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordEncoding::Bitmask => f.write_str("bitmask"),
            KeywordEncoding::Text => f.write_str("text"),
        }
    }
}

impl std::str::FromStr for KeywordEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bitmask" => Ok(KeywordEncoding::Bitmask),
            "text" => Ok(KeywordEncoding::Text),
            other => Err(Error::InvalidInput(format!(
                "Unknown keyword encoding: {} (expected bitmask or text)",
                other
            ))),
        }
    }
}

/// Encoded keyword column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredKeywords {
    Mask(i64),
    Text(String),
}

impl StoredKeywords {
    pub fn is_empty(&self) -> bool {
        match self {
            StoredKeywords::Mask(mask) => *mask == 0,
            StoredKeywords::Text(text) => text.is_empty(),
        }
    }
}

/// Sorted, deduplicated set of keywords
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordSet(BTreeSet<Keyword>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: Keyword) -> bool {
        self.0.insert(keyword)
    }

    pub fn contains(&self, keyword: Keyword) -> bool {
        self.0.contains(&keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Keywords in canonical sorted order
    pub fn iter(&self) -> impl Iterator<Item = Keyword> + '_ {
        self.0.iter().copied()
    }

    /// OR of `1 << position` over all members
    pub fn to_mask(&self) -> u64 {
        self.iter().fold(0, |mask, k| mask | k.bit())
    }

    /// Decode a bitmask; bits outside the vocabulary are rejected
    pub fn from_mask(mask: u64) -> Result<Self> {
        let mut set = KeywordSet::new();
        let mut remaining = mask;
        while remaining != 0 {
            let position = remaining.trailing_zeros();
            let keyword = Keyword::from_position(position).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Keyword mask {:#x} has bit {} outside the vocabulary",
                    mask, position
                ))
            })?;
            set.insert(keyword);
            remaining &= remaining - 1;
        }
        Ok(set)
    }

    /// Sorted identifiers joined by the text delimiter
    pub fn to_text(&self) -> String {
        self.iter()
            .map(Keyword::as_str)
            .collect::<Vec<_>>()
            .join(&TEXT_DELIMITER.to_string())
    }

    /// Decode delimited text; blank segments are ignored, unknown ones rejected
    pub fn from_text(text: &str) -> Result<Self> {
        text.split(TEXT_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Keyword>())
            .collect()
    }

    pub fn encode(&self, encoding: KeywordEncoding) -> StoredKeywords {
        match encoding {
            KeywordEncoding::Bitmask => StoredKeywords::Mask(self.to_mask() as i64),
            KeywordEncoding::Text => StoredKeywords::Text(self.to_text()),
        }
    }

    pub fn decode(stored: &StoredKeywords) -> Result<Self> {
        match stored {
            StoredKeywords::Mask(mask) => {
                if *mask < 0 {
                    return Err(Error::InvalidInput(format!("Negative keyword mask: {}", mask)));
                }
                Self::from_mask(*mask as u64)
            }
            StoredKeywords::Text(text) => Self::from_text(text),
        }
    }
}

impl FromIterator<Keyword> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        KeywordSet(iter.into_iter().collect())
    }
}

impl Extend<Keyword> for KeywordSet {
    fn extend<I: IntoIterator<Item = Keyword>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Required/excluded keyword masks, evaluated as one integer comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskFilter {
    pub required: u64,
    pub excluded: u64,
}

impl MaskFilter {
    pub fn new(required: &KeywordSet, excluded: &KeywordSet) -> Self {
        Self {
            required: required.to_mask(),
            excluded: excluded.to_mask(),
        }
    }

    /// Conditions on the `keywords` column with their integer binds
    ///
    /// At most one comparison each for the required and excluded masks.
    pub fn sql_conditions(&self) -> Vec<(&'static str, Vec<i64>)> {
        let mut conditions = Vec::new();
        if self.required != 0 {
            let required = self.required as i64;
            conditions.push(("(keywords & ?) = ?", vec![required, required]));
        }
        if self.excluded != 0 {
            conditions.push(("(keywords & ?) = 0", vec![self.excluded as i64]));
        }
        conditions
    }

    #[cfg(test)]
    fn matches(&self, value: u64) -> bool {
        value & self.required == self.required && value & self.excluded == 0
    }
}

/// `LIKE` pattern testing membership on the text encoding
///
/// Substring semantics: the pattern for `loda` also matches a stored
/// `loda-loop`. Kept only for stores written with the text encoding.
pub fn text_like_pattern(keyword: Keyword) -> String {
    format!("%{}%", keyword.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keywords: &[Keyword]) -> KeywordSet {
        keywords.iter().copied().collect()
    }

    #[test]
    fn test_mask_positions() {
        let s = set(&[Keyword::Base, Keyword::Bref]);
        assert_eq!(s.to_mask(), 0b11);
        assert_eq!(set(&[Keyword::Word]).to_mask(), 1 << 38);
    }

    #[test]
    fn test_mask_round_trip_over_vocabulary_subsets() {
        // Walk a spread of masks: every single bit, every adjacent pair, and the full set
        let full: u64 = (1u64 << Keyword::COUNT) - 1;
        let mut masks = vec![0, full];
        for i in 0..Keyword::COUNT {
            masks.push(1 << i);
            if i + 1 < Keyword::COUNT {
                masks.push(0b11 << i);
            }
        }
        masks.push(0x5555_5555_55 & full);
        for mask in masks {
            let decoded = KeywordSet::from_mask(mask).unwrap();
            assert_eq!(decoded.to_mask(), mask);
        }
    }

    #[test]
    fn test_mask_rejects_bits_outside_vocabulary() {
        let err = KeywordSet::from_mask(1 << Keyword::COUNT).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_text_is_sorted_and_deduplicated() {
        let s: KeywordSet = [Keyword::Nonn, Keyword::Easy, Keyword::Nonn, Keyword::Loda]
            .into_iter()
            .collect();
        assert_eq!(s.to_text(), "easy,loda,nonn");
        assert_eq!(KeywordSet::from_text("nonn, easy,,loda").unwrap(), s);
        assert!(KeywordSet::from_text("nonn,changed").is_err());
    }

    #[test]
    fn test_encode_decode_both_encodings() {
        let s = set(&[Keyword::Formula, Keyword::LodaLoop, Keyword::Pari]);
        for encoding in [KeywordEncoding::Bitmask, KeywordEncoding::Text] {
            let stored = s.encode(encoding);
            assert!(!stored.is_empty());
            assert_eq!(KeywordSet::decode(&stored).unwrap(), s);
        }
        assert!(KeywordSet::new().encode(KeywordEncoding::Bitmask).is_empty());
        assert!(KeywordSet::new().encode(KeywordEncoding::Text).is_empty());
        assert!(KeywordSet::decode(&StoredKeywords::Mask(-1)).is_err());
    }

    #[test]
    fn test_mask_filter() {
        let value = set(&[Keyword::Easy, Keyword::Loda, Keyword::Nonn]).to_mask();
        let must_loda = MaskFilter::new(&set(&[Keyword::Loda]), &KeywordSet::new());
        assert!(must_loda.matches(value));

        let must_not_nonn = MaskFilter::new(&KeywordSet::new(), &set(&[Keyword::Nonn]));
        assert!(!must_not_nonn.matches(value));

        let combined = MaskFilter::new(&set(&[Keyword::Easy, Keyword::Loda]), &set(&[Keyword::Sign]));
        assert!(combined.matches(value));
        assert!(MaskFilter::default().matches(0));
    }

    #[test]
    fn test_mask_filter_sql_conditions() {
        assert!(MaskFilter::default().sql_conditions().is_empty());
        let filter = MaskFilter::new(&set(&[Keyword::Base, Keyword::Bref]), &set(&[Keyword::Word]));
        assert_eq!(
            filter.sql_conditions(),
            vec![
                ("(keywords & ?) = ?", vec![0b11_i64, 0b11]),
                ("(keywords & ?) = 0", vec![1_i64 << 38]),
            ]
        );
    }

    #[test]
    fn test_text_membership_false_positive() {
        let text = set(&[Keyword::LodaLoop]).to_text();
        let pattern = text_like_pattern(Keyword::Loda);
        assert_eq!(pattern, "%loda%");
        assert!(text.contains(pattern.trim_matches('%')));
        let mask = set(&[Keyword::LodaLoop]).to_mask();
        assert!(!MaskFilter::new(&set(&[Keyword::Loda]), &KeywordSet::new()).matches(mask));
    }

    #[test]
    fn test_encoding_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            encoding: KeywordEncoding,
        }
        let w: Wrapper = toml::from_str("encoding = \"text\"").unwrap();
        assert_eq!(w.encoding, KeywordEncoding::Text);
        assert_eq!(KeywordEncoding::default(), KeywordEncoding::Bitmask);
    }
}
