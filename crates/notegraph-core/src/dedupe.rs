//! # Link Deduplicator
//!
//! Collapses case-variant duplicate wikilinks inside list-valued properties.
//!
//! Entries are grouped by the lower-cased target of their first wikilink
//! (section and display ignored). Within a group the entry whose target has
//! the most uppercase characters survives; ties keep the first one. Entries
//! without a link are never touched, and survivors keep their relative order.
//!
//! This is a pure function over one list. It does not consult the alias
//! table: `[[ML]]` and `[[Machine Learning]]` are different entries here.

use crate::note::Note;
use crate::vault::Vault;
use crate::{FileError, NoteKey, NotegraphError, wikilink};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of deduplicating one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeResult {
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub removed: Vec<String>,
}

/// Duplicates found in one file, by property name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDuplicates {
    pub file: String,
    pub properties: BTreeMap<String, DedupeResult>,
}

/// Result of a vault-wide scan or fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeReport {
    pub total_files_scanned: usize,
    pub files_with_duplicates: usize,
    pub total_duplicates_found: usize,
    pub files: Vec<FileDuplicates>,
    pub errors: Vec<FileError>,
}

// =============================================================================
// PURE LIST DEDUPLICATION
// =============================================================================

/// Positions of the entries that lose to a case variant.
#[must_use]
pub fn duplicate_indices(entries: &[String]) -> Vec<usize> {
    // key -> (index of current survivor, its uppercase count)
    let mut survivors: BTreeMap<NoteKey, (usize, usize)> = BTreeMap::new();
    let mut removed = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        let Some(link) = wikilink::extract(entry).next() else {
            continue;
        };
        let capitals = link.target.chars().filter(|c| c.is_uppercase()).count();

        match survivors.get_mut(&link.key()) {
            None => {
                survivors.insert(link.key(), (idx, capitals));
            }
            Some(current) if capitals > current.1 => {
                removed.push(current.0);
                *current = (idx, capitals);
            }
            Some(_) => removed.push(idx),
        }
    }

    removed.sort_unstable();
    removed
}

/// Deduplicate one list of entries.
#[must_use]
pub fn dedupe_list(entries: &[String]) -> DedupeResult {
    let doomed = duplicate_indices(entries);
    let mut after = Vec::with_capacity(entries.len());
    let mut removed = Vec::with_capacity(doomed.len());
    for (idx, entry) in entries.iter().enumerate() {
        if doomed.contains(&idx) {
            removed.push(entry.clone());
        } else {
            after.push(entry.clone());
        }
    }
    DedupeResult {
        before: entries.to_vec(),
        after,
        removed,
    }
}

// =============================================================================
// FILE AND VAULT PASSES
// =============================================================================

/// Duplicates in every wikilink list property of `note`.
#[must_use]
pub fn check_note(note: &Note) -> BTreeMap<String, DedupeResult> {
    let mut found = BTreeMap::new();
    for name in note.frontmatter.wikilink_list_properties() {
        let Some(entries) = note.frontmatter.get(&name).and_then(|v| v.as_list()) else {
            continue;
        };
        let result = dedupe_list(entries);
        if !result.removed.is_empty() {
            found.insert(name, result);
        }
    }
    found
}

/// Remove duplicates from `note` and write it back under `root`.
///
/// Only the removed item lines change; nothing is written when there is
/// nothing to remove.
pub fn dedupe_note(
    note: &mut Note,
    root: &std::path::Path,
) -> Result<BTreeMap<String, DedupeResult>, NotegraphError> {
    let found = check_note(note);
    if found.is_empty() {
        return Ok(found);
    }
    for name in found.keys() {
        let Some(entries) = note.frontmatter.get(name).and_then(|v| v.as_list()) else {
            continue;
        };
        let doomed = duplicate_indices(entries);
        note.frontmatter
            .remove_list_indices(name, &doomed)
            .map_err(|defect| note.malformed(defect))?;
    }
    note.save(root)?;
    Ok(found)
}

/// Scan every well-formed note; with `fix`, rewrite each affected file.
#[must_use]
pub fn run(vault: &Vault, fix: bool) -> DedupeReport {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for entry in vault.notes().iter().filter(|n| !n.malformed) {
        let found = if fix {
            let mut note = entry.note.clone();
            match dedupe_note(&mut note, vault.root()) {
                Ok(found) => found,
                Err(e) => {
                    errors.push(FileError::new(entry.note.display_path(), &e));
                    check_note(&entry.note)
                }
            }
        } else {
            check_note(&entry.note)
        };
        if !found.is_empty() {
            files.push(FileDuplicates {
                file: entry.note.display_path(),
                properties: found,
            });
        }
    }

    DedupeReport {
        total_files_scanned: vault.len(),
        files_with_duplicates: files.len(),
        total_duplicates_found: files
            .iter()
            .flat_map(|f| f.properties.values())
            .map(|r| r.removed.len())
            .sum(),
        files,
        errors,
    }
}

// =============================================================================
// TESTS
// =============================================================================
