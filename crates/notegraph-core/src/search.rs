//! # Frontmatter Search
//!
//! Queries over parsed property values across a vault: find notes whose
//! property matches a value, and tally the distinct values of a property.
//!
//! Scalars and list items are compared one string at a time; a list matches
//! when any item does. Properties without a value never match.

use crate::primitives::SUMMARY_PROPERTY;
use crate::vault::Vault;
use crate::{NotegraphError, PropertyValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How a property value is compared with the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Case-insensitive equality.
    Eq,
    /// Case-insensitive substring.
    #[default]
    Contains,
    /// Lexicographic `value >= query`.
    Gte,
    /// Lexicographic `value <= query`.
    Lte,
}

impl Operator {
    /// Compare one stored string with the query.
    #[must_use]
    pub fn matches(self, stored: &str, query: &str) -> bool {
        match self {
            Self::Eq => stored.to_lowercase() == query.to_lowercase(),
            Self::Contains => stored.to_lowercase().contains(&query.to_lowercase()),
            Self::Gte => stored >= query,
            Self::Lte => stored <= query,
        }
    }

    /// True if any string of `value` matches.
    #[must_use]
    pub fn matches_value(self, value: &PropertyValue, query: &str) -> bool {
        value.as_strings().iter().any(|s| self.matches(s, query))
    }
}

impl FromStr for Operator {
    type Err = NotegraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "contains" => Ok(Self::Contains),
            "gte" => Ok(Self::Gte),
            "lte" => Ok(Self::Lte),
            other => Err(NotegraphError::ConfigError(format!(
                "unknown operator '{other}' (expected eq, contains, gte or lte)"
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "eq",
            Self::Contains => "contains",
            Self::Gte => "gte",
            Self::Lte => "lte",
        })
    }
}

/// One matching note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub file: String,
    pub property: String,
    pub value: PropertyValue,
    /// The note's `summary`, or empty.
    pub summary: String,
}

/// Notes whose `property` matches `query` under `operator`, in vault order.
#[must_use]
pub fn search(vault: &Vault, property: &str, query: &str, operator: Operator) -> Vec<SearchHit> {
    vault
        .notes()
        .iter()
        .filter(|n| !n.malformed)
        .filter_map(|n| {
            let value = n.note.frontmatter.get(property)?;
            if *value == PropertyValue::Absent || !operator.matches_value(value, query) {
                return None;
            }
            let summary = n
                .note
                .frontmatter
                .get(SUMMARY_PROPERTY)
                .and_then(PropertyValue::as_scalar)
                .unwrap_or_default()
                .to_string();
            Some(SearchHit {
                file: n.note.display_path(),
                property: property.to_string(),
                value: value.clone(),
                summary,
            })
        })
        .collect()
}

/// Distinct values of `property` with their counts, most frequent first,
/// ties in value order.
#[must_use]
pub fn values(vault: &Vault, property: &str) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in vault.notes().iter().filter(|n| !n.malformed) {
        if let Some(value) = entry.note.frontmatter.get(property) {
            for s in value.as_strings() {
                let count = counts.entry(s).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;
    use std::path::PathBuf;

    fn vault() -> Vault {
        let notes = [
            ("A", "---\nstatus: Draft\ntags: [rust, cli]\nrating: 3\nsummary: first\n---\n"),
            ("B", "---\nstatus: done\ntags:\n  - rust\nrating: 5\n---\n"),
            ("C", "---\nstatus:\ntags: [go]\n---\n"),
        ]
        .iter()
        .map(|(name, text)| Note::parse(PathBuf::from(format!("{name}.md")), text))
        .collect();
        Vault::from_notes(PathBuf::from("."), notes, Vec::new())
    }

    fn files(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.file.as_str()).collect()
    }

    #[test]
    fn operators_parse() {
        assert_eq!("gte".parse::<Operator>().expect("gte"), Operator::Gte);
        assert!("like".parse::<Operator>().is_err());
        assert_eq!(Operator::default().to_string(), "contains");
    }

    #[test]
    fn eq_and_contains_ignore_case() {
        let v = vault();
        assert_eq!(files(&search(&v, "status", "draft", Operator::Eq)), vec!["A.md"]);
        assert_eq!(files(&search(&v, "status", "D", Operator::Contains)), vec!["A.md", "B.md"]);
    }

    #[test]
    fn list_matches_any_item() {
        let v = vault();
        let hits = search(&v, "tags", "rust", Operator::Eq);
        assert_eq!(files(&hits), vec!["A.md", "B.md"]);
        assert_eq!(hits[0].summary, "first");
        assert_eq!(hits[1].summary, "");
    }

    #[test]
    fn range_operators_are_lexicographic() {
        let v = vault();
        assert_eq!(files(&search(&v, "rating", "4", Operator::Gte)), vec!["B.md"]);
        assert_eq!(files(&search(&v, "rating", "4", Operator::Lte)), vec!["A.md"]);
    }

    #[test]
    fn absent_values_never_match() {
        let v = vault();
        assert!(search(&v, "status", "", Operator::Contains).iter().all(|h| h.file != "C.md"));
    }

    #[test]
    fn values_sorted_by_count_then_value() {
        let v = vault();
        assert_eq!(
            values(&v, "tags"),
            vec![("rust".to_string(), 2), ("cli".to_string(), 1), ("go".to_string(), 1)]
        );
    }
}
