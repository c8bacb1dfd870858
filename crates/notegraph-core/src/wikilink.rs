//! # Wikilink Extractor
//!
//! Recognizes `[[target]]`, `[[target|display]]`, `[[target#section]]` and
//! `[[target#section|display]]` anywhere in note text.
//!
//! - Extraction is lazy and stateless: `extract` can be called any number of
//!   times on the same text and yields the same sequence
//! - Byte offsets of every match are kept so callers can apply surgical edits
//! - Only the target is trimmed; section anchors and display text are kept
//!   verbatim

use crate::NoteKey;
use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;

// Compile regex once, reuse across calls
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]\n]+)\]\]").expect("wikilink pattern is valid")
});

// =============================================================================
// WIKILINK
// =============================================================================

/// One occurrence of wikilink syntax in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wikilink {
    /// The full matched text, brackets included.
    pub raw: String,
    /// The note-name portion, trimmed.
    pub target: String,
    /// Text after `#`, if present.
    pub section: Option<String>,
    /// Text after `|`, if present.
    pub display: Option<String>,
    /// Byte offset of `[[` in the scanned text.
    pub start: usize,
    /// Byte offset just past `]]`.
    pub end: usize,
}

impl Wikilink {
    /// True iff the link uses the pipe/display form.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.display.is_some()
    }

    /// True iff the link points at a section of the target.
    #[must_use]
    pub fn is_section_link(&self) -> bool {
        self.section.is_some()
    }

    /// Canonical comparison key of the target.
    #[must_use]
    pub fn key(&self) -> NoteKey {
        normalize(&self.target)
    }

    /// Split the inside of `[[...]]`.
    ///
    /// A `|` always introduces display text for whatever precedes it, and
    /// within that prefix a `#` always separates target from section.
    fn from_inner(raw: &str, inner: &str, start: usize, end: usize) -> Option<Self> {
        let (head, display) = match inner.split_once('|') {
            Some((head, display)) => (head, Some(display.to_string())),
            None => (inner, None),
        };
        let (target, section) = match head.split_once('#') {
            Some((target, section)) => (target, Some(section.to_string())),
            None => (head, None),
        };

        let target = target.trim();
        if target.is_empty() {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            target: target.to_string(),
            section,
            display,
            start,
            end,
        })
    }
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Lazy iterator over the wikilinks of a text.
///
/// Links with an empty target (`[[]]`, `[[#Heading]]`) are skipped.
pub struct Wikilinks<'t> {
    matches: CaptureMatches<'static, 't>,
}

impl Iterator for Wikilinks<'_> {
    type Item = Wikilink;

    fn next(&mut self) -> Option<Self::Item> {
        for cap in self.matches.by_ref() {
            let (Some(full), Some(inner)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            if let Some(link) =
                Wikilink::from_inner(full.as_str(), inner.as_str(), full.start(), full.end())
            {
                return Some(link);
            }
        }
        None
    }
}

/// Extract every wikilink in `text`, in order of appearance.
pub fn extract(text: &str) -> Wikilinks<'_> {
    Wikilinks {
        matches: WIKILINK_RE.captures_iter(text),
    }
}

/// Extract only the targets (trimmed, case preserved), in order of appearance.
pub fn targets(text: &str) -> Vec<String> {
    extract(text).map(|link| link.target).collect()
}

/// Canonical comparison key of a link target: trimmed and lower-cased.
#[must_use]
pub fn normalize(target: &str) -> NoteKey {
    NoteKey::new(target)
}

/// Render a plain link to a note.
#[must_use]
pub fn format_link(name: &str) -> String {
    format!("[[{name}]]")
}

/// Render an explicit link: target with display text.
#[must_use]
pub fn format_explicit_link(target: &str, display: &str) -> String {
    format!("[[{target}|{display}]]")
}

// =============================================================================
// TEXT EDITS
// =============================================================================

/// A text edit: replace the bytes `start..end` with `insert_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte offset in source
    pub start: usize,
    /// Byte offset just past the replaced span
    pub end: usize,
    /// Replacement text
    pub insert_text: String,
}

/// Apply non-overlapping edits to `text`.
///
/// Edits are applied from the highest offset down so earlier offsets stay
/// valid. Edits outside the text or on non-char boundaries are ignored.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = text.to_string();
    for edit in ordered {
        if edit.start <= edit.end
            && edit.end <= result.len()
            && result.is_char_boundary(edit.start)
            && result.is_char_boundary(edit.end)
        {
            result.replace_range(edit.start..edit.end, &edit.insert_text);
        }
    }
    result
}

// =============================================================================
// TESTS
// =============================================================================
