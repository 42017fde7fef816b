//! Classification rules
//!
//! Each rule reads the fact sheet and returns the keywords it adds. Rules do
//! not see each other's output; the classifier unions their results.

use super::FactSheet;
use seqdb_common::Keyword;

/// A named classification rule
pub type Rule = (&'static str, fn(&FactSheet<'_>) -> Vec<Keyword>);

pub const RULES: &[Rule] = &[
    ("seed_existing", seed_existing),
    ("formula_field", formula_field),
    ("conjecture_text", conjecture_text),
    ("decimal_expansion", decimal_expansion),
    ("egf_marker", egf_marker),
    ("gf_marker", gf_marker),
    ("program_markers", program_markers),
    ("artifact_signals", artifact_signals),
    ("eval_sets", eval_sets),
];

const CONJECTURE_MARKERS: [&str; 3] = ["conjecture", "it appears", "empirical"];

/// Program listing markers and the tool tag each one adds
const PROGRAM_MARKERS: [(&str, Keyword); 3] = [
    ("(PARI)", Keyword::Pari),
    ("(Maple)", Keyword::Maple),
    ("(Mathematica)", Keyword::Mathematica),
];

/// Known tags from the existing keyword text; unknown tags are reported separately
pub fn seed_existing(facts: &FactSheet<'_>) -> Vec<Keyword> {
    existing_tags(facts)
        .filter_map(|tag| tag.parse().ok())
        .collect()
}

/// Existing tags not in the vocabulary
pub fn unknown_existing(facts: &FactSheet<'_>) -> Vec<String> {
    existing_tags(facts)
        .filter(|tag| tag.parse::<Keyword>().is_err())
        .map(str::to_string)
        .collect()
}

fn existing_tags<'a>(facts: &FactSheet<'a>) -> impl Iterator<Item = &'a str> {
    facts
        .keywords
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
}

pub fn formula_field(facts: &FactSheet<'_>) -> Vec<Keyword> {
    match facts.formulas {
        Some(text) if !text.trim().is_empty() => vec![Keyword::Formula],
        _ => Vec::new(),
    }
}

pub fn conjecture_text(facts: &FactSheet<'_>) -> Vec<Keyword> {
    if CONJECTURE_MARKERS.iter().any(|m| facts.blob.contains(m)) {
        vec![Keyword::Conjecture]
    } else {
        Vec::new()
    }
}

pub fn decimal_expansion(facts: &FactSheet<'_>) -> Vec<Keyword> {
    if facts.blob.contains("decimal expansion") {
        vec![Keyword::DecimalExpansion]
    } else {
        Vec::new()
    }
}

pub fn egf_marker(facts: &FactSheet<'_>) -> Vec<Keyword> {
    if facts.blob.contains("e.g.f.") {
        vec![Keyword::EgfExpansion]
    } else {
        Vec::new()
    }
}

/// `g.f.` counts only where it is not the tail of `e.g.f.`
pub fn gf_marker(facts: &FactSheet<'_>) -> Vec<Keyword> {
    let blob = facts.blob.as_str();
    let found = blob
        .match_indices("g.f.")
        .any(|(idx, _)| !blob[..idx].ends_with("e."));
    if found {
        vec![Keyword::GfExpansion]
    } else {
        Vec::new()
    }
}

pub fn program_markers(facts: &FactSheet<'_>) -> Vec<Keyword> {
    let Some(programs) = facts.programs else {
        return Vec::new();
    };
    PROGRAM_MARKERS
        .iter()
        .filter(|(marker, _)| programs.contains(marker))
        .map(|(_, keyword)| *keyword)
        .collect()
}

pub fn artifact_signals(facts: &FactSheet<'_>) -> Vec<Keyword> {
    facts
        .artifact
        .map(|scan| scan.signals().iter().collect())
        .unwrap_or_default()
}

pub fn eval_sets(facts: &FactSheet<'_>) -> Vec<Keyword> {
    let mut tags = Vec::new();
    if facts.inceval {
        tags.push(Keyword::LodaInceval);
    }
    if facts.logeval {
        tags.push(Keyword::LodaLogeval);
    }
    tags
}
