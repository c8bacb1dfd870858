//! # Semantic Link Synchronizer
//!
//! Validates and repairs relationship invariants between notes:
//! - symmetric: `RELATED_TO: [[B]]` in A requires `RELATED_TO: [[A]]` in B
//! - reversed: `NEXT: [[B]]` in A requires `PRIOR: [[A]]` in B, and the mirror
//!
//! Every run starts with an in-memory normalization pass that rewrites inline
//! wikilink values of relationship properties to the multi-line list form, so
//! comma-joined notes are never reported as missing links. Targets that
//! resolve to no note are placeholders and are skipped silently.
//!
//! Fixes are grouped per target file; each file is written at most once and
//! atomically. Files are independent: a failure on one is recorded and the
//! rest are still written. Re-running completes whatever a failed run left.

use crate::note::Note;
use crate::primitives::{DEFAULT_REVERSED_PAIRS, DEFAULT_SYMMETRIC_PROPERTIES};
use crate::vault::Vault;
use crate::{FileError, NoteKey, wikilink};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// RULES
// =============================================================================

/// One relationship invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The property must point back with the same property.
    Symmetric(String),
    /// `property` in the source requires `complement` in the target.
    Reversed { property: String, complement: String },
}

impl Rule {
    /// Property read on the source note.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::Symmetric(p) => p,
            Self::Reversed { property, .. } => property,
        }
    }

    /// Property that must hold the back-link on the target note.
    #[must_use]
    pub fn complement(&self) -> &str {
        match self {
            Self::Symmetric(p) => p,
            Self::Reversed { complement, .. } => complement,
        }
    }

    fn issue_kind(&self) -> IssueKind {
        match self {
            Self::Symmetric(_) => IssueKind::MissingBacklink,
            Self::Reversed { .. } => IssueKind::MissingReverseLink,
        }
    }
}

/// The set of invariants a run enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRules {
    rules: Vec<Rule>,
}

impl Default for SyncRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_SYMMETRIC_PROPERTIES.iter().map(|p| (*p).to_string()).collect(),
            DEFAULT_REVERSED_PAIRS
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect(),
        )
    }
}

impl SyncRules {
    /// Symmetric rules first, then reversed pairs in property order.
    #[must_use]
    pub fn new(symmetric: Vec<String>, reversed: BTreeMap<String, String>) -> Self {
        let mut rules: Vec<Rule> = symmetric.into_iter().map(Rule::Symmetric).collect();
        rules.extend(
            reversed
                .into_iter()
                .map(|(property, complement)| Rule::Reversed { property, complement }),
        );
        Self { rules }
    }

    /// The rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every property any rule reads or writes.
    #[must_use]
    pub fn properties(&self) -> BTreeSet<String> {
        self.rules
            .iter()
            .flat_map(|r| [r.property().to_string(), r.complement().to_string()])
            .collect()
    }
}

// =============================================================================
// ISSUES AND REPORT
// =============================================================================

/// Which invariant is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingBacklink,
    MissingReverseLink,
}

/// One missing back-link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncIssue {
    /// Note declaring the link.
    pub source: String,
    /// Note missing the back-link.
    pub target: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Property on the source.
    pub property: String,
    /// Property on the target that must hold the back-link.
    pub target_property: String,
    pub action: String,
    /// True once the back-link has been written to disk.
    pub fixed: bool,
}

/// Result of a validate or sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub total_files: usize,
    pub files_with_issues: usize,
    pub total_issues: usize,
    pub issues: Vec<SyncIssue>,
    pub fixed: usize,
    /// Files whose inline relationship values were (or would be) rewritten.
    pub normalized_files: Vec<String>,
    pub errors: Vec<FileError>,
}

/// Whether a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Detect only. Nothing is written.
    Validate,
    /// Detect, normalize and fix, writing through the frontmatter store.
    Sync,
}

// =============================================================================
// RUN
// =============================================================================

/// Validate or sync the vault.
///
/// With `only`, issues are limited to that note as the source, and only it
/// and the targets it needs fixed are written.
#[must_use]
pub fn run(vault: &Vault, rules: &SyncRules, mode: SyncMode, only: Option<usize>) -> SyncReport {
    let mut notes: Vec<Option<Note>> = vault
        .notes()
        .iter()
        .map(|n| (!n.malformed).then(|| n.note.clone()))
        .collect();
    let mut errors = Vec::new();

    let normalized = normalize(&mut notes, rules, &mut errors);
    let mut issues = detect(vault, &notes, rules, only);

    let mut written = BTreeSet::new();
    if mode == SyncMode::Sync {
        let mut touched: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (issue_idx, (target, issue)) in issues.iter().enumerate() {
            let Some(note) = notes.get_mut(*target).and_then(Option::as_mut) else {
                continue;
            };
            let link = wikilink::format_link(&issue.source);
            match note.frontmatter.append_to_list(&issue.target_property, &[link]) {
                Ok(_) => touched.entry(*target).or_default().push(issue_idx),
                Err(defect) => errors.push(FileError::new(note.display_path(), &note.malformed(defect))),
            }
        }

        let dirty: BTreeSet<usize> = normalized
            .iter()
            .copied()
            .filter(|idx| only.is_none_or(|o| o == *idx))
            .chain(touched.keys().copied())
            .collect();
        for idx in dirty {
            let Some(note) = notes.get(idx).and_then(Option::as_ref) else {
                continue;
            };
            match note.save(vault.root()) {
                Ok(()) => {
                    written.insert(idx);
                }
                Err(e) => errors.push(FileError::new(note.display_path(), &e)),
            }
        }
        for (target, issue_indices) in &touched {
            if written.contains(target) {
                for &i in issue_indices {
                    if let Some((_, issue)) = issues.get_mut(i) {
                        issue.fixed = true;
                    }
                }
            }
        }
    }

    let issues: Vec<SyncIssue> = issues.into_iter().map(|(_, issue)| issue).collect();
    let files_with_issues = issues
        .iter()
        .map(|i| i.source.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let normalized_files = normalized
        .iter()
        .filter(|idx| mode == SyncMode::Validate || written.contains(*idx))
        .filter_map(|&idx| vault.get(idx).map(|n| n.note.display_path()))
        .collect();

    SyncReport {
        total_files: vault.len(),
        files_with_issues,
        total_issues: issues.len(),
        fixed: issues.iter().filter(|i| i.fixed).count(),
        issues,
        normalized_files,
        errors,
    }
}

/// Fold multi-line plain scalars onto one line and rewrite inline
/// relationship values to list form. Returns changed notes.
fn normalize(notes: &mut [Option<Note>], rules: &SyncRules, errors: &mut Vec<FileError>) -> Vec<usize> {
    let properties = rules.properties();
    let mut changed = Vec::new();
    for (idx, slot) in notes.iter_mut().enumerate() {
        let Some(note) = slot.as_mut() else {
            continue;
        };
        let mut any = false;
        match note.frontmatter.fold_continuations() {
            Ok(folded) => any |= !folded.is_empty(),
            Err(defect) => errors.push(FileError::new(note.display_path(), &note.malformed(defect))),
        }
        for prop in &properties {
            match note.frontmatter.normalize_inline_links(prop) {
                Ok(true) => any = true,
                Ok(false) => {}
                Err(defect) => errors.push(FileError::new(note.display_path(), &note.malformed(defect))),
            }
        }
        if any {
            changed.push(idx);
        }
    }
    changed
}

/// Every missing back-link, paired with the target note index.
fn detect(
    vault: &Vault,
    notes: &[Option<Note>],
    rules: &SyncRules,
    only: Option<usize>,
) -> Vec<(usize, SyncIssue)> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();

    for (source, slot) in notes.iter().enumerate() {
        if only.is_some_and(|o| o != source) {
            continue;
        }
        let Some(note) = slot else {
            continue;
        };

        for rule in rules.rules() {
            for target_name in linked_targets(note, rule.property()) {
                let Some(target) = vault.resolve(&target_name) else {
                    continue;
                };
                if target == source {
                    continue;
                }
                let Some(target_note) = notes.get(target).and_then(Option::as_ref) else {
                    continue;
                };
                if points_back(vault, target_note, rule.complement(), source, &note.key()) {
                    continue;
                }
                if !seen.insert((source, target, rule.complement().to_string())) {
                    continue;
                }
                issues.push((
                    target,
                    SyncIssue {
                        source: note.name.clone(),
                        target: target_note.name.clone(),
                        kind: rule.issue_kind(),
                        property: rule.property().to_string(),
                        target_property: rule.complement().to_string(),
                        action: format!(
                            "Add {} to {}'s {}",
                            wikilink::format_link(&note.name),
                            target_note.name,
                            rule.complement()
                        ),
                        fixed: false,
                    },
                ));
            }
        }
    }
    issues
}

/// Link targets held by `property`, list items and inline strings alike.
fn linked_targets(note: &Note, property: &str) -> Vec<String> {
    note.frontmatter
        .get(property)
        .map(|v| v.as_strings())
        .unwrap_or_default()
        .iter()
        .flat_map(|entry| wikilink::targets(entry))
        .collect()
}

/// True if `property` of `target` links to the note at `source`.
fn points_back(vault: &Vault, target: &Note, property: &str, source: usize, source_key: &NoteKey) -> bool {
    linked_targets(target, property)
        .iter()
        .any(|t| NoteKey::new(t) == *source_key || vault.resolve(t) == Some(source))
}

// =============================================================================
// TESTS
// =============================================================================
