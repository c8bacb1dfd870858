//! # Note
//!
//! One markdown file: its identity, its frontmatter block and its body.
//!
//! Writes are all-or-nothing per file: the new text goes to a temporary file
//! in the same directory, is flushed, then renamed over the original.

use crate::frontmatter::Frontmatter;
use crate::primitives::ALIASES_PROPERTY;
use crate::wikilink::{self, Wikilink};
use crate::{FrontmatterDefect, NoteKey, NotegraphError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A note file, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Path relative to the vault root.
    pub path: PathBuf,
    /// File stem, case preserved. The identity used in links.
    pub name: String,
    /// The frontmatter block.
    pub frontmatter: Frontmatter,
    /// Everything after the closing delimiter (the whole file without one).
    pub body: String,
}

impl Note {
    /// Parse note text. `path` is relative to the vault root.
    pub fn parse(path: PathBuf, text: &str) -> Self {
        let name = note_name(&path);
        let (frontmatter, body) = Frontmatter::split(text);
        Self {
            path,
            name,
            frontmatter,
            body,
        }
    }

    /// Read and parse `root/relative`.
    pub fn load(root: &Path, relative: &Path) -> Result<Self, NotegraphError> {
        let text = fs::read_to_string(root.join(relative))
            .map_err(|e| NotegraphError::IoError(format!("{}: {e}", relative.display())))?;
        Ok(Self::parse(relative.to_path_buf(), &text))
    }

    /// The full file text as it would be written.
    #[must_use]
    pub fn text(&self) -> String {
        self.frontmatter.render(&self.body)
    }

    /// Lookup key of the note name.
    #[must_use]
    pub fn key(&self) -> NoteKey {
        NoteKey::new(&self.name)
    }

    /// Relative path with `/` separators, for reports.
    #[must_use]
    pub fn display_path(&self) -> String {
        display_path(&self.path)
    }

    /// Every wikilink in the file, frontmatter and body, with offsets into
    /// [`Note::text`].
    #[must_use]
    pub fn links(&self) -> Vec<Wikilink> {
        wikilink::extract(&self.text()).collect()
    }

    /// Declared aliases, trimmed, empty entries dropped.
    #[must_use]
    pub fn aliases(&self) -> Vec<String> {
        self.frontmatter
            .get(ALIASES_PROPERTY)
            .map(|v| v.as_strings())
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Wrap a frontmatter defect with this note's path.
    #[must_use]
    pub fn malformed(&self, defect: FrontmatterDefect) -> NotegraphError {
        NotegraphError::MalformedFrontmatter {
            file: self.display_path(),
            defect,
        }
    }

    /// Write the note back to `root/path` atomically.
    pub fn save(&self, root: &Path) -> Result<(), NotegraphError> {
        write_atomic(&root.join(&self.path), &self.text())
    }
}

/// The stem of a note path.
#[must_use]
pub fn note_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A path with `/` separators regardless of platform.
#[must_use]
pub fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Replace `path` with `contents` via a sibling temporary file and rename.
///
/// An existing file keeps its permissions. On any failure the original file
/// is left untouched and the temporary file is removed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), NotegraphError> {
    let io_err = |e: std::io::Error| NotegraphError::IoError(format!("{}: {e}", path.display()));
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents.as_bytes()).map_err(io_err)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_takes_name_from_stem() {
        let note = Note::parse(PathBuf::from("dir/Deep Work.md"), "---\naliases: [DW]\n---\nbody");
        assert_eq!(note.name, "Deep Work");
        assert_eq!(note.key(), NoteKey::new("deep work"));
        assert_eq!(note.display_path(), "dir/Deep Work.md");
        assert_eq!(note.aliases(), vec!["DW"]);
        assert_eq!(note.body, "body");
    }

    #[test]
    fn links_cover_frontmatter_and_body() {
        let note = Note::parse(PathBuf::from("A.md"), "---\nup: \"[[B]]\"\n---\nsee [[C|c]]\n");
        let targets: Vec<_> = note.links().into_iter().map(|l| l.target).collect();
        assert_eq!(targets, vec!["B", "C"]);
    }

    #[test]
    fn aliases_accept_scalar_and_skip_blanks() {
        let note = Note::parse(PathBuf::from("A.md"), "---\naliases:\n  - \" \"\n  - x\n---\n");
        assert_eq!(note.aliases(), vec!["x"]);
        let note = Note::parse(PathBuf::from("A.md"), "---\naliases: single\n---\n");
        assert_eq!(note.aliases(), vec!["single"]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let text = "---\ntitle: x\n---\nbody\n";
        let note = Note::parse(PathBuf::from("A.md"), text);
        note.save(dir.path()).expect("save");

        let loaded = Note::load(dir.path(), Path::new("A.md")).expect("load");
        assert_eq!(loaded, note);
        assert_eq!(fs::read_to_string(dir.path().join("A.md")).expect("read"), text);
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("n.md");
        fs::write(&path, "old").expect("seed");
        write_atomic(&path, "new").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
        let leftovers = fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("n.md");
        fs::write(&path, "old").expect("seed");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        write_atomic(&path, "new").expect("write");
        let mode = fs::metadata(&path).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = Note::load(dir.path(), Path::new("missing.md")).expect_err("missing");
        assert!(matches!(err, NotegraphError::IoError(_)));
    }

    #[test]
    fn malformed_names_the_file() {
        let note = Note::parse(PathBuf::from("sub/A.md"), "");
        let err = note.malformed(FrontmatterDefect::Unterminated);
        assert!(err.to_string().contains("sub/A.md"));
    }
}
