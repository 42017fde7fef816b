//! Keyword classifier
//!
//! Derives the keyword set and contributor list of one entry from its raw
//! fields, its program artifact (if any), and the program stats id sets.
//!
//! Classification is a pure function of a read-only [`FactSheet`]: every rule
//! in [`rules::RULES`] sees the same facts and the results are unioned, so
//! rule order has no effect on the output. The only I/O is the artifact read
//! done by [`KeywordClassifier::classify`] before building the fact sheet.

pub mod rules;

use crate::error::Result;
use crate::models::RawEntry;
use crate::services::artifact_resolver::{ArtifactResolver, ArtifactScan};
use crate::services::stats_reader::EvalSets;
use seqdb_common::KeywordSet;
use std::sync::Arc;

/// Placeholder character stripped from the leading author segment
const AUTHOR_PLACEHOLDER: char = '_';

/// Read-only inputs of the classification rules
#[derive(Debug, Clone)]
pub struct FactSheet<'a> {
    pub id: usize,
    pub comments: Option<&'a str>,
    pub formulas: Option<&'a str>,
    /// Pre-existing comma-separated tag text
    pub keywords: Option<&'a str>,
    pub programs: Option<&'a str>,
    pub artifact: Option<&'a ArtifactScan>,
    pub inceval: bool,
    pub logeval: bool,
    /// Lowercased comments and formulas
    blob: String,
}

impl<'a> FactSheet<'a> {
    pub fn new(id: usize, comments: Option<&'a str>, formulas: Option<&'a str>) -> Self {
        let blob = format!("{}\n{}", comments.unwrap_or(""), formulas.unwrap_or("")).to_lowercase();
        Self {
            id,
            comments,
            formulas,
            keywords: None,
            programs: None,
            artifact: None,
            inceval: false,
            logeval: false,
            blob,
        }
    }

    pub fn from_entry(
        entry: &RawEntry<'a>,
        artifact: Option<&'a ArtifactScan>,
        eval_sets: &EvalSets,
    ) -> Self {
        Self {
            keywords: entry.keywords,
            programs: entry.programs,
            artifact,
            inceval: eval_sets.is_inceval(entry.id),
            logeval: eval_sets.is_logeval(entry.id),
            ..Self::new(entry.id, entry.comments, entry.formulas)
        }
    }
}

/// Keyword set of a fact sheet plus any unknown pre-existing tags
pub fn classify_facts(facts: &FactSheet<'_>) -> (KeywordSet, Vec<String>) {
    let keywords: KeywordSet = rules::RULES
        .iter()
        .flat_map(|(_, rule)| rule(facts))
        .collect();
    (keywords, rules::unknown_existing(facts))
}

/// Contributors of an entry: leading author segment, then artifact submitters
///
/// No deduplication; the same name may appear twice.
pub fn extract_contributors(author: Option<&str>, artifact: Option<&ArtifactScan>) -> Vec<String> {
    let mut contributors = Vec::new();

    if let Some(author) = author {
        let first = author.split(',').next().unwrap_or("");
        let cleaned: String = first.chars().filter(|c| *c != AUTHOR_PLACEHOLDER).collect();
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            contributors.push(cleaned.to_string());
        }
    }

    if let Some(scan) = artifact {
        contributors.extend(scan.contributors.iter().cloned());
    }

    contributors
}

/// Classified output for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub id: usize,
    pub keywords: KeywordSet,
    pub contributors: Vec<String>,
    pub derived_formula: Option<String>,
    /// Pre-existing tags dropped because they are not in the vocabulary
    pub unknown_keywords: Vec<String>,
    pub has_artifact: bool,
}

/// Per-entry classifier shared read-only across pool workers
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    artifacts: ArtifactResolver,
    eval_sets: Arc<EvalSets>,
}

impl KeywordClassifier {
    pub fn new(artifacts: ArtifactResolver, eval_sets: Arc<EvalSets>) -> Self {
        Self {
            artifacts,
            eval_sets,
        }
    }

    /// Classify one entry; absence of signal is never an error
    pub fn classify(&self, entry: &RawEntry<'_>) -> Result<Classification> {
        let artifact = self.artifacts.resolve(entry.id)?;
        let facts = FactSheet::from_entry(entry, artifact.as_ref(), &self.eval_sets);
        let (keywords, unknown_keywords) = classify_facts(&facts);

        if !unknown_keywords.is_empty() {
            tracing::debug!(
                id = entry.id,
                unknown = ?unknown_keywords,
                "Dropping keywords outside the vocabulary"
            );
        }

        let contributors = extract_contributors(entry.author, artifact.as_ref());
        let derived_formula = artifact.as_ref().and_then(|scan| scan.derived_formula.clone());

        Ok(Classification {
            id: entry.id,
            keywords,
            contributors,
            derived_formula,
            unknown_keywords,
            has_artifact: artifact.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqdb_common::Keyword;
    use std::collections::HashSet;

    fn tags(set: &KeywordSet) -> String {
        set.to_text()
    }

    #[test]
    fn test_formula_field_with_plain_artifact() {
        let scan = ArtifactScan::default();
        let mut facts = FactSheet::new(96, None, Some("a(n) = n*(n+3)/2."));
        facts.artifact = Some(&scan);
        let (keywords, unknown) = classify_facts(&facts);
        assert_eq!(tags(&keywords), "formula,loda");
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_conjecture_in_comments() {
        let facts = FactSheet::new(1, Some("Conjectured by Smith that a(n) grows linearly"), None);
        let (keywords, _) = classify_facts(&facts);
        assert!(keywords.contains(Keyword::Conjecture));
    }

    #[test]
    fn test_output_sorted_and_deduplicated() {
        let scan = ArtifactScan {
            derived_formula: Some("a(n) = n^2".to_string()),
            ..Default::default()
        };
        let mut facts = FactSheet::new(
            290,
            Some("It appears this is the decimal expansion of nothing."),
            Some("G.f.: x*(1+x)/(1-x)^3."),
        );
        facts.keywords = Some("nonn,loda,easy,nonn,changed");
        facts.programs = Some("(PARI) a(n)=n^2");
        facts.artifact = Some(&scan);
        facts.inceval = true;

        let (keywords, unknown) = classify_facts(&facts);
        assert_eq!(
            tags(&keywords),
            "conjecture,decimal-expansion,easy,formula,gf-expansion,loda,loda-formula,loda-inceval,nonn,pari"
        );
        assert_eq!(unknown, vec!["changed".to_string()]);
    }

    #[test]
    fn test_no_signal_is_empty() {
        let facts = FactSheet::new(5, None, None);
        let (keywords, unknown) = classify_facts(&facts);
        assert!(keywords.is_empty());
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_extract_contributors() {
        let scan = ArtifactScan {
            contributors: vec!["Jane Doe".to_string(), "_N. J. A. Sloane_".to_string()],
            ..Default::default()
        };
        let contributors = extract_contributors(Some("_N. J. A. Sloane_, Mar 15 1996"), Some(&scan));
        // artifact names are kept verbatim, and repeats are not removed
        assert_eq!(
            contributors,
            vec!["N. J. A. Sloane", "Jane Doe", "_N. J. A. Sloane_"]
        );
        assert!(extract_contributors(None, None).is_empty());
        assert!(extract_contributors(Some(" , x"), None).is_empty());
    }

    #[test]
    fn test_classifier_reads_artifact_and_sets() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ArtifactResolver::new(dir.path());
        let path = resolver.artifact_path(45);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "; Submitted by Jane Doe\n; Formula: a(n) = a(n-1) + a(n-2)\nmov $1,1\nlpb $0\nlpe\n",
        )
        .unwrap();

        let sets = EvalSets::new(HashSet::from([45]), HashSet::new());
        let classifier = KeywordClassifier::new(resolver, Arc::new(sets));

        let entry = RawEntry {
            id: 45,
            name: Some("Fibonacci numbers"),
            author: Some("_N. J. A. Sloane_"),
            keywords: Some("core,nonn,nice,easy"),
            ..RawEntry::empty(45)
        };
        let c = classifier.classify(&entry).unwrap();
        assert_eq!(
            tags(&c.keywords),
            "core,easy,loda,loda-formula,loda-inceval,loda-loop,nice,nonn"
        );
        assert_eq!(c.contributors, vec!["N. J. A. Sloane", "Jane Doe"]);
        assert_eq!(c.derived_formula.as_deref(), Some("a(n) = a(n-1) + a(n-2)"));
        assert!(c.has_artifact);

        let missing = classifier.classify(&RawEntry::empty(46)).unwrap();
        assert!(!missing.has_artifact);
        assert!(missing.keywords.is_empty());
        assert_eq!(missing.derived_formula, None);
    }
}
