//! # Vault Index
//!
//! Walks a directory tree of notes and builds the lookup tables every other
//! component consumes:
//! - name table: note key -> note (one note per case-insensitive name)
//! - alias table: alias key -> owning note name
//! - per-note wikilinks, frontmatter and body included
//!
//! A scan is a pure function of the directory contents. Nothing is cached
//! between scans; callers re-scan per command.
//!
//! ## Determinism
//!
//! Directory entries are visited in file-name order and notes are stored
//! sorted by key, so every listing derived from a `Vault` is reproducible on
//! unchanged input.

use crate::note::{Note, display_path};
use crate::primitives::{DEFAULT_EXTENSIONS, SKIP_DIRS};
use crate::wikilink::Wikilink;
use crate::{NoteKey, NotegraphError, ScanWarning};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

// =============================================================================
// SCAN OPTIONS
// =============================================================================

/// What a scan considers part of the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Directory names (or root-relative paths) skipped in addition to
    /// [`SKIP_DIRS`] and hidden directories.
    pub exclude_dirs: Vec<String>,
    /// File extensions treated as notes, without the dot.
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

impl ScanOptions {
    fn skips_dir(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref()) {
            return true;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map(display_path)
            .unwrap_or_default();
        self.exclude_dirs.iter().any(|ex| {
            let ex = ex.trim_matches('/');
            ex == name || ex == relative
        })
    }

    fn is_note(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy())
            .is_some_and(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(&ext)))
    }
}

// =============================================================================
// INDEXED NOTE
// =============================================================================

/// A note as seen by the index.
#[derive(Debug, Clone)]
pub struct IndexedNote {
    /// The parsed note.
    pub note: Note,
    /// Links found at scan time. Empty for malformed notes.
    pub links: Vec<Wikilink>,
    /// True when the frontmatter could not be parsed safely or the file
    /// could not be read; such a note contributes no aliases, properties or
    /// links and is never written.
    pub malformed: bool,
}

impl IndexedNote {
    fn new(note: Note) -> Self {
        let malformed = !note.frontmatter.is_well_formed();
        let links = if malformed { Vec::new() } else { note.links() };
        Self {
            note,
            links,
            malformed,
        }
    }

    /// Placeholder for a file that exists but could not be read. It keeps
    /// its name so links to it still resolve.
    fn unreadable(relative: &Path) -> Self {
        Self {
            note: Note::parse(relative.to_path_buf(), ""),
            links: Vec::new(),
            malformed: true,
        }
    }
}

/// One entry of the alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// The alias as first declared (case preserved).
    pub alias: String,
    /// Name of the owning note.
    pub note: String,
}

// =============================================================================
// VAULT
// =============================================================================

/// The result of scanning one vault directory.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    notes: Vec<IndexedNote>,
    names: BTreeMap<NoteKey, usize>,
    aliases: BTreeMap<NoteKey, AliasEntry>,
    warnings: Vec<ScanWarning>,
}

impl Vault {
    /// Scan `root` and build the name and alias tables.
    ///
    /// # Errors
    ///
    /// `VaultScan` when the root or a directory under it cannot be read.
    /// Individual notes never fail the scan; they produce warnings.
    pub fn scan(root: &Path, options: &ScanOptions) -> Result<Self, NotegraphError> {
        if !root.is_dir() {
            return Err(NotegraphError::VaultScan {
                path: root.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let mut warnings = Vec::new();
        let mut loaded: Vec<IndexedNote> = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !options.skips_dir(root, entry));

        for entry in walker {
            let entry = entry.map_err(|e| NotegraphError::VaultScan {
                path: e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() || !options.is_note(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };

            let note = match Note::load(root, relative) {
                Ok(note) => note,
                Err(e) => {
                    warnings.push(ScanWarning::UnreadableNote {
                        file: display_path(relative),
                        reason: e.to_string(),
                    });
                    loaded.push(IndexedNote::unreadable(relative));
                    continue;
                }
            };

            if let Some(defect) = note.frontmatter.defects().into_iter().next() {
                warnings.push(ScanWarning::MalformedNote {
                    file: note.display_path(),
                    reason: defect.to_string(),
                });
            }
            loaded.push(IndexedNote::new(note));
        }

        Ok(Self::index(root.to_path_buf(), loaded, warnings))
    }

    /// Build the index from already-parsed notes.
    ///
    /// Notes with a name already taken (case-insensitively) by an earlier
    /// note in `notes` are dropped with a `DuplicateNoteName` warning.
    pub fn from_notes(root: PathBuf, notes: Vec<Note>, warnings: Vec<ScanWarning>) -> Self {
        Self::index(root, notes.into_iter().map(IndexedNote::new).collect(), warnings)
    }

    fn index(root: PathBuf, notes: Vec<IndexedNote>, mut warnings: Vec<ScanWarning>) -> Self {
        let mut by_key: BTreeMap<NoteKey, IndexedNote> = BTreeMap::new();
        for entry in notes {
            let key = entry.note.key();
            if let Some(kept) = by_key.get(&key) {
                warnings.push(ScanWarning::DuplicateNoteName {
                    name: entry.note.name.clone(),
                    kept: kept.note.display_path(),
                    shadowed: entry.note.display_path(),
                });
                continue;
            }
            by_key.insert(key, entry);
        }

        let mut names = BTreeMap::new();
        let mut indexed = Vec::with_capacity(by_key.len());
        for (idx, (key, entry)) in by_key.into_iter().enumerate() {
            names.insert(key, idx);
            indexed.push(entry);
        }

        let mut aliases: BTreeMap<NoteKey, AliasEntry> = BTreeMap::new();
        for entry in indexed.iter().filter(|n| !n.malformed) {
            let own_key = entry.note.key();
            for alias in entry.note.aliases() {
                let key = NoteKey::new(&alias);
                if key == own_key {
                    continue;
                }
                match aliases.get(&key) {
                    Some(existing) if existing.note != entry.note.name => {
                        warnings.push(ScanWarning::AliasConflict {
                            alias,
                            kept_note: existing.note.clone(),
                            other_note: entry.note.name.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        aliases.insert(
                            key,
                            AliasEntry {
                                alias,
                                note: entry.note.name.clone(),
                            },
                        );
                    }
                }
            }
        }

        Self {
            root,
            notes: indexed,
            names,
            aliases,
            warnings,
        }
    }

    // -------------------------------------------------------------------------
    // ACCESSORS
    // -------------------------------------------------------------------------

    /// The scanned root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All notes, sorted by key.
    #[must_use]
    pub fn notes(&self) -> &[IndexedNote] {
        &self.notes
    }

    /// Number of indexed notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True when the vault holds no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note at `idx` in sorted order.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&IndexedNote> {
        self.notes.get(idx)
    }

    /// Non-fatal findings of the scan.
    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Alias table, sorted by lower-cased alias.
    pub fn aliases(&self) -> impl Iterator<Item = (&NoteKey, &AliasEntry)> {
        self.aliases.iter()
    }

    /// Index of the note stored at `relative` (root-relative path).
    #[must_use]
    pub fn position_by_path(&self, relative: &Path) -> Option<usize> {
        self.notes.iter().position(|n| n.note.path == relative)
    }

    // -------------------------------------------------------------------------
    // RESOLUTION
    // -------------------------------------------------------------------------

    /// True if `key` is the name of a note.
    #[must_use]
    pub fn is_note_name(&self, key: &NoteKey) -> bool {
        self.names.contains_key(key)
    }

    /// Owner of alias `key`, if any.
    #[must_use]
    pub fn alias_owner(&self, key: &NoteKey) -> Option<&AliasEntry> {
        self.aliases.get(key)
    }

    /// Index of the note whose name matches `target`.
    ///
    /// Path-qualified targets (`folder/Note`) and a trailing `.md` are
    /// accepted.
    #[must_use]
    pub fn resolve_name(&self, target: &str) -> Option<usize> {
        candidate_keys(target)
            .iter()
            .find_map(|key| self.names.get(key).copied())
    }

    /// Index of the note `target` points at: by name first, then by alias.
    #[must_use]
    pub fn resolve(&self, target: &str) -> Option<usize> {
        let keys = candidate_keys(target);
        keys.iter().find_map(|key| {
            self.names.get(key).copied().or_else(|| {
                self.aliases
                    .get(key)
                    .and_then(|entry| self.names.get(&NoteKey::new(&entry.note)).copied())
            })
        })
    }

    /// Resolve `target` or fail with `NoteNotFound`.
    pub fn require(&self, target: &str) -> Result<usize, NotegraphError> {
        self.resolve(target)
            .ok_or_else(|| NotegraphError::NoteNotFound(target.to_string()))
    }
}

/// Lookup keys tried for a link target, most specific first.
fn candidate_keys(target: &str) -> Vec<NoteKey> {
    let trimmed = target.trim();
    let stripped = strip_md_suffix(trimmed);
    let mut keys = vec![NoteKey::new(stripped)];
    if let Some((_, base)) = stripped.rsplit_once('/') {
        let key = NoteKey::new(base);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn strip_md_suffix(target: &str) -> &str {
    let len = target.len();
    if len > 3 && target.is_char_boundary(len - 3) && target[len - 3..].eq_ignore_ascii_case(".md") {
        &target[..len - 3]
    } else {
        target
    }
}

/// The vault root for a single note file: the nearest ancestor holding a
/// `.obsidian` directory, else the file's own directory.
///
/// Relative paths are made absolute against the working directory first, so
/// the search can climb above it and the result is never empty.
pub fn find_vault_root(file: &Path) -> Result<PathBuf, NotegraphError> {
    let file = std::path::absolute(file)
        .map_err(|e| NotegraphError::IoError(format!("{}: {e}", file.display())))?;
    let parent = file.parent().unwrap_or(file.as_path());
    Ok(parent
        .ancestors()
        .find(|dir| dir.join(".obsidian").is_dir())
        .unwrap_or(parent)
        .to_path_buf())
}

// =============================================================================
// TESTS
// =============================================================================
