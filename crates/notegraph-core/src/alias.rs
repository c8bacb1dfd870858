//! # Alias Resolver
//!
//! Rewrites links that name a note by one of its aliases into the explicit
//! `[[Note|alias]]` form, and collapses redundant `[[Note|Note]]` links.
//!
//! ## Detection order
//!
//! A link is an alias candidate only if it has no display text, no section,
//! and its key is in the alias table but *not* in the name table. A string
//! that is both a note name and someone's alias is a direct link and is never
//! rewritten. Every rewrite produces a link that no longer matches either
//! rule, so fixing twice changes nothing the second time.

use crate::note::{Note, write_atomic};
use crate::vault::Vault;
use crate::wikilink::{self, TextEdit};
use crate::{FileError, NotegraphError};
use serde::Serialize;

/// Which rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
    /// `[[alias]]` pointing at a note through its alias.
    AliasLink,
    /// `[[Note|Note]]` whose display text repeats the target.
    RedundantAlias,
}

/// One link to rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasOccurrence {
    #[serde(rename = "type")]
    pub kind: OccurrenceKind,
    /// The link as written.
    pub original: String,
    /// The alias (or repeated display text) as the user wrote it.
    pub alias: String,
    /// Canonical name of the note the link points at.
    pub actual_note: String,
    /// Text that replaces `original`.
    pub replacement: String,
    /// Byte offset of `original` in the file.
    pub start: usize,
    /// Byte offset just past `original`.
    pub end: usize,
}

impl AliasOccurrence {
    /// The edit that applies this occurrence.
    #[must_use]
    pub fn edit(&self) -> TextEdit {
        TextEdit {
            start: self.start,
            end: self.end,
            insert_text: self.replacement.clone(),
        }
    }
}

/// Occurrences found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAliasLinks {
    pub file: String,
    pub count: usize,
    pub occurrences: Vec<AliasOccurrence>,
}

/// Result of a vault-wide scan or fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasReport {
    pub total_aliases_indexed: usize,
    pub files_with_alias_links: usize,
    pub total_occurrences: usize,
    pub files: Vec<FileAliasLinks>,
    /// Files whose rewrite failed; their occurrences are still listed.
    pub errors: Vec<FileError>,
}

// =============================================================================
// DETECTION
// =============================================================================

/// Find every alias or redundant link in `text`, in order of appearance.
#[must_use]
pub fn find_alias_links(vault: &Vault, text: &str) -> Vec<AliasOccurrence> {
    let mut found = Vec::new();
    for link in wikilink::extract(text) {
        if link.is_section_link() {
            continue;
        }
        let key = link.key();

        match link.display.as_deref() {
            None => {
                if vault.is_note_name(&key) {
                    continue;
                }
                let Some(entry) = vault.alias_owner(&key) else {
                    continue;
                };
                found.push(AliasOccurrence {
                    kind: OccurrenceKind::AliasLink,
                    replacement: resolve_alias_link(&entry.note, &link.target),
                    original: link.raw,
                    alias: link.target,
                    actual_note: entry.note.clone(),
                    start: link.start,
                    end: link.end,
                });
            }
            Some(display) if display == link.target => {
                let Some(idx) = vault.resolve_name(&link.target) else {
                    continue;
                };
                let Some(note) = vault.get(idx) else {
                    continue;
                };
                found.push(AliasOccurrence {
                    kind: OccurrenceKind::RedundantAlias,
                    replacement: wikilink::format_link(&link.target),
                    original: link.raw,
                    alias: display.to_string(),
                    actual_note: note.note.name.clone(),
                    start: link.start,
                    end: link.end,
                });
            }
            Some(_) => {}
        }
    }
    found
}

/// Replacement for an alias link: canonical target, the user's text as display.
#[must_use]
pub fn resolve_alias_link(actual_note: &str, alias_text: &str) -> String {
    wikilink::format_explicit_link(actual_note, alias_text)
}

/// Apply `occurrences` to the text they were found in.
#[must_use]
pub fn apply(text: &str, occurrences: &[AliasOccurrence]) -> String {
    let edits: Vec<TextEdit> = occurrences.iter().map(AliasOccurrence::edit).collect();
    wikilink::apply_edits(text, &edits)
}

// =============================================================================
// FILE AND VAULT PASSES
// =============================================================================

/// Occurrences in one note.
#[must_use]
pub fn check_note(vault: &Vault, note: &Note) -> Vec<AliasOccurrence> {
    find_alias_links(vault, &note.text())
}

/// Rewrite one note in place. Returns the applied occurrences.
pub fn resolve_note(vault: &Vault, note: &Note) -> Result<Vec<AliasOccurrence>, NotegraphError> {
    let text = note.text();
    let occurrences = find_alias_links(vault, &text);
    if !occurrences.is_empty() {
        write_atomic(&vault.root().join(&note.path), &apply(&text, &occurrences))?;
    }
    Ok(occurrences)
}

/// Scan every note; with `fix`, rewrite each affected file.
///
/// A failed write is recorded in `errors` and the pass continues.
#[must_use]
pub fn run(vault: &Vault, fix: bool) -> AliasReport {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for entry in vault.notes() {
        let note = &entry.note;
        let occurrences = if fix {
            match resolve_note(vault, note) {
                Ok(found) => found,
                Err(e) => {
                    errors.push(FileError::new(note.display_path(), &e));
                    check_note(vault, note)
                }
            }
        } else {
            check_note(vault, note)
        };
        if !occurrences.is_empty() {
            files.push(FileAliasLinks {
                file: note.display_path(),
                count: occurrences.len(),
                occurrences,
            });
        }
    }

    AliasReport {
        total_aliases_indexed: vault.aliases().count(),
        files_with_alias_links: files.len(),
        total_occurrences: files.iter().map(|f| f.count).sum(),
        files,
        errors,
    }
}

// =============================================================================
// TESTS
// =============================================================================
