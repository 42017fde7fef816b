//! Keyword vocabulary
//!
//! The vocabulary is fixed and closed. Variants are declared in lexicographic
//! order of their textual identifier, so the derived `Ord`, the bit position
//! used by the bitmask codec, and the canonical sorted storage order all agree.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A member of the closed classification vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Keyword {
    Base,
    Bref,
    Cofr,
    Conjecture,
    Cons,
    Core,
    Dead,
    DecimalExpansion,
    Dumb,
    Easy,
    EgfExpansion,
    Eigen,
    Fini,
    Formula,
    Frac,
    Full,
    GfExpansion,
    Hard,
    Less,
    Loda,
    LodaFormula,
    LodaInceval,
    LodaLogeval,
    LodaLoop,
    Look,
    Maple,
    Mathematica,
    More,
    Mult,
    Nice,
    Nonn,
    Obsc,
    Pari,
    Sign,
    Tabf,
    Tabl,
    Unkn,
    Walk,
    Word,
}

/// Vocabulary table, indexed by `Keyword as usize`
const VOCABULARY: [(Keyword, &str, &str); 39] = [
    (Keyword::Base, "base", "Sequence terms are defined based on a number representation in a particular base format, e.g. decimal or binary"),
    (Keyword::Bref, "bref", "Sequences with very few terms"),
    (Keyword::Cofr, "cofr", "Continued fractions for (usually irrational) constants"),
    (Keyword::Conjecture, "conjecture", "Sequences that include conjectures in their description"),
    (Keyword::Cons, "cons", "Sequences that give terms for decimal expansions"),
    (Keyword::Core, "core", "Core sequences"),
    (Keyword::Dead, "dead", "Erroneous or duplicate sequences"),
    (Keyword::DecimalExpansion, "decimal-expansion", "Decimal expansions of constants"),
    (Keyword::Dumb, "dumb", "Unimportant sequences from non-mathematical contexts"),
    (Keyword::Easy, "easy", "Sequences that are easy to compute and understand"),
    (Keyword::EgfExpansion, "egf-expansion", "Expansions of exponential generating functions"),
    (Keyword::Eigen, "eigen", "Eigensequences"),
    (Keyword::Fini, "fini", "Finite sequences"),
    (Keyword::Formula, "formula", "Formulas exist for these sequences"),
    (Keyword::Frac, "frac", "Numerators or denominators of sequence of rationals"),
    (Keyword::Full, "full", "Finite sequence with all terms available"),
    (Keyword::GfExpansion, "gf-expansion", "Expansions of generating functions"),
    (Keyword::Hard, "hard", "Sequences that are hard to compute"),
    (Keyword::Less, "less", "Less interesting sequences"),
    (Keyword::Loda, "loda", "LODA programs exist for these sequences"),
    (Keyword::LodaFormula, "loda-formula", "Formulas generated from LODA programs exist for these sequences"),
    (Keyword::LodaInceval, "loda-inceval", "LODA programs that can be computed incrementally exist for these sequences"),
    (Keyword::LodaLogeval, "loda-logeval", "LODA programs with logarithmic complexity exist for these sequences"),
    (Keyword::LodaLoop, "loda-loop", "LODA programs with loop exist for these sequences"),
    (Keyword::Look, "look", "Pin or scatter plots reveal interesting information"),
    (Keyword::Maple, "maple", "Maple programs exist for these sequences"),
    (Keyword::Mathematica, "mathematica", "Mathematica programs exist for these sequences"),
    (Keyword::More, "more", "Sequences that need more terms"),
    (Keyword::Mult, "mult", "Multiplicative functions"),
    (Keyword::Nice, "nice", "Exceptionally \"nice\" sequences"),
    (Keyword::Nonn, "nonn", "Sequences with only non-negative terms"),
    (Keyword::Obsc, "obsc", "Obscure sequences: descriptions are known, but difficult to understand"),
    (Keyword::Pari, "pari", "PARI/GP programs exist for these sequences"),
    (Keyword::Sign, "sign", "Sequences with negative terms"),
    (Keyword::Tabf, "tabf", "Tables with irregular row lengths"),
    (Keyword::Tabl, "tabl", "Regular tables: fixed row length"),
    (Keyword::Unkn, "unkn", "Sequences whose definition is unknown"),
    (Keyword::Walk, "walk", "Sequences that contain walks through a lattice"),
    (Keyword::Word, "word", "Numbers related to a given natural language"),
];

impl Keyword {
    /// Number of keywords in the vocabulary
    pub const COUNT: usize = VOCABULARY.len();

    /// All keywords in canonical (sorted) order
    pub fn all() -> impl Iterator<Item = Keyword> {
        VOCABULARY.iter().map(|(k, _, _)| *k)
    }

    /// Stable textual identifier
    pub fn as_str(self) -> &'static str {
        VOCABULARY[self as usize].1
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        VOCABULARY[self as usize].2
    }

    /// Bit position used by the bitmask codec
    pub fn position(self) -> u32 {
        self as u32
    }

    /// Single-bit mask for this keyword
    pub fn bit(self) -> u64 {
        1u64 << self.position()
    }

    /// Keyword at a given bit position
    pub fn from_position(position: u32) -> Option<Keyword> {
        VOCABULARY.get(position as usize).map(|(k, _, _)| *k)
    }
}

impl FromStr for Keyword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        VOCABULARY
            .binary_search_by(|(_, id, _)| (*id).cmp(s))
            .map(|idx| VOCABULARY[idx].0)
            .map_err(|_| Error::InvalidInput(format!("Unknown keyword: {}", s)))
    }
}

impl TryFrom<String> for Keyword {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Keyword> for String {
    fn from(k: Keyword) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_table_matches_discriminants() {
        for (idx, (k, _, _)) in VOCABULARY.iter().enumerate() {
            assert_eq!(*k as usize, idx, "table row {} out of place", idx);
        }
    }

    #[test]
    fn test_vocabulary_is_sorted_by_identifier() {
        let ids: Vec<&str> = Keyword::all().map(Keyword::as_str).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        sorted.dedup();
        assert_eq!(sorted.len(), Keyword::COUNT);
    }

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!("loda-loop".parse::<Keyword>().unwrap(), Keyword::LodaLoop);
        assert_eq!("base".parse::<Keyword>().unwrap(), Keyword::Base);
        assert_eq!("word".parse::<Keyword>().unwrap(), Keyword::Word);
        assert!("changed".parse::<Keyword>().is_err());
        assert!("Loda".parse::<Keyword>().is_err());
    }

    #[test]
    fn test_masks_fit_in_sqlite_integer() {
        let all: u64 = Keyword::all().map(Keyword::bit).fold(0, |acc, b| acc | b);
        assert!(all <= i64::MAX as u64);
        assert_eq!(Keyword::from_position(Keyword::COUNT as u32), None);
        assert_eq!(Keyword::from_position(0), Some(Keyword::Base));
    }

    #[test]
    fn test_descriptions_present() {
        assert!(Keyword::all().all(|k| !k.description().is_empty()));
    }
}
