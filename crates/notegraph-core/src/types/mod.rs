//! # Core Type Definitions
//!
//! This module contains the shared types of the notegraph engine:
//! - Lookup identity for notes (`NoteKey`)
//! - Frontmatter property values (`PropertyValue`)
//! - Error types (`NotegraphError`, `FrontmatterDefect`)
//! - Non-fatal scan findings (`ScanWarning`) and per-file batch failures
//!   (`FileError`)
//!
//! ## Determinism Guarantees
//!
//! All key types implement `Ord` so that they can be stored in
//! `BTreeMap`/`BTreeSet` and every listing comes out in a stable order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// NOTE IDENTITY
// =============================================================================

/// Case-insensitive lookup key for a note name or alias.
///
/// Built by trimming and lower-casing. Display text is never derived from a
/// key; the case-preserving name lives on the `Note` itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteKey(String);

impl NoteKey {
    /// Create a key from any note name, alias or link target.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PROPERTY VALUE
// =============================================================================

/// Value of a single frontmatter property.
///
/// Closed variant: a property is a scalar string, a list of scalar strings,
/// or present without a value (`key:`, `key: null`, `key: ~`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A single-line scalar (quotes removed).
    Scalar(String),
    /// A multi-line `- item` list or an inline `[a, b]` list.
    List(Vec<String>),
    /// Key present, no value.
    Absent,
}

impl PropertyValue {
    /// Flatten to a list of strings (`Absent` is empty, a scalar is one item).
    #[must_use]
    pub fn as_strings(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
            Self::Absent => Vec::new(),
        }
    }

    /// Get the list items if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the scalar if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

// =============================================================================
// SCAN WARNINGS
// =============================================================================

/// A non-fatal finding recorded while scanning a vault.
///
/// Warnings never abort a scan; they are surfaced in command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// The note's frontmatter could not be parsed. The note is indexed with
    /// empty frontmatter and no links.
    MalformedNote { file: String, reason: String },

    /// The note could not be read (permissions, invalid UTF-8).
    UnreadableNote { file: String, reason: String },

    /// Two files share a stem. The first in path order keeps the name.
    DuplicateNoteName {
        name: String,
        kept: String,
        shadowed: String,
    },

    /// Two notes declare the same alias. The first note in name order keeps it.
    AliasConflict {
        alias: String,
        kept_note: String,
        other_note: String,
    },
}

/// A per-file failure inside a batch operation.
///
/// Batch passes record these and continue with the next file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

impl FileError {
    /// Record `error` against `file`.
    pub fn new(file: impl Into<String>, error: &NotegraphError) -> Self {
        Self {
            file: file.into(),
            error: error.to_string(),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Why a frontmatter block cannot be safely mutated.
///
/// Reading tolerates all of these; writing refuses to guess.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontmatterDefect {
    /// The opening `---` has no matching closing line.
    #[error("closing `---` delimiter not found")]
    Unterminated,

    /// A property has both an inline value and `- item` lines.
    #[error("property `{0}` mixes inline and multi-line list syntax")]
    MixedListSyntax(String),

    /// A line is neither a property, a list item, a continuation nor a comment.
    #[error("line {line} is not a property: {text}")]
    UnparseableLine { line: usize, text: String },

    /// A property value the YAML parser rejects.
    #[error("property `{property}` is not valid YAML: {reason}")]
    InvalidValue { property: String, reason: String },
}

/// Errors that can occur in the notegraph engine.
///
/// - Batch operations isolate per-file failures and keep going
/// - Single-target operations fail on the first of these
/// - The engine never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum NotegraphError {
    /// Walking the vault directory failed at the I/O level.
    #[error("Vault scan failed at {}: {reason}", path.display())]
    VaultScan { path: PathBuf, reason: String },

    /// A note's frontmatter cannot be safely mutated.
    #[error("Malformed frontmatter in {file}: {defect}")]
    MalformedFrontmatter {
        file: String,
        defect: FrontmatterDefect,
    },

    /// The requested note does not exist in the vault.
    #[error("Note '{0}' not found in vault")]
    NoteNotFound(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_key_is_trimmed_and_lowercased() {
        assert_eq!(NoteKey::new("  Machine Learning "), NoteKey::new("machine learning"));
        assert_eq!(NoteKey::new("ML").as_str(), "ml");
    }

    #[test]
    fn note_keys_order_deterministically() {
        let mut keys = vec![NoteKey::new("b"), NoteKey::new("C"), NoteKey::new("a")];
        keys.sort();
        let keys: Vec<_> = keys.iter().map(NoteKey::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn property_value_flattening() {
        assert_eq!(PropertyValue::Absent.as_strings(), Vec::<String>::new());
        assert_eq!(PropertyValue::Scalar("x".into()).as_strings(), vec!["x"]);
        assert_eq!(
            PropertyValue::List(vec!["a".into(), "b".into()]).as_strings(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn property_value_accessors() {
        assert!(PropertyValue::Absent.as_list().is_none());
        assert!(PropertyValue::Scalar("s".into()).as_list().is_none());
        assert_eq!(PropertyValue::Scalar("s".into()).as_scalar(), Some("s"));
        assert_eq!(
            PropertyValue::List(vec!["a".into()]).as_list(),
            Some(&["a".to_string()][..])
        );
    }

    #[test]
    fn file_error_keeps_message() {
        let err = FileError::new("A.md", &NotegraphError::NoteNotFound("B".into()));
        assert_eq!(err.file, "A.md");
        assert_eq!(err.error, "Note 'B' not found in vault");
    }

    #[test]
    fn error_messages_name_the_file() {
        let err = NotegraphError::MalformedFrontmatter {
            file: "notes/A.md".into(),
            defect: FrontmatterDefect::MixedListSyntax("RELATED_TO".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("notes/A.md"));
        assert!(msg.contains("RELATED_TO"));
    }
}
