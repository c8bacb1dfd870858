//! # Summary Write-Back
//!
//! Stores an externally generated summary in a note's `summary` property.
//!
//! Machine-written summaries carry the `[AI]` prefix. A summary without it
//! was written by a person and is never overwritten.

use crate::note::Note;
use crate::primitives::{AI_SUMMARY_PREFIX, SUMMARY_PROPERTY};
use crate::{NotegraphError, PropertyValue};
use serde::Serialize;
use std::path::Path;

/// What happened to the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Written,
    Skipped,
    DryRun,
}

/// Result of one write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutcome {
    pub file: String,
    pub status: SummaryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub old_summary: Option<String>,
    pub new_summary: Option<String>,
}

/// The stored form of `text`: prefixed, single line.
#[must_use]
pub fn ai_summary(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{AI_SUMMARY_PREFIX} {single_line}")
}

/// `summary` rendered as a double-quoted YAML scalar.
fn quoted(summary: &str) -> String {
    format!("\"{}\"", summary.replace('\\', "\\\\").replace('"', "\\\""))
}

/// True when an existing summary may be replaced.
fn is_replaceable(existing: Option<&PropertyValue>) -> bool {
    match existing {
        None | Some(PropertyValue::Absent) => true,
        Some(value) => value
            .as_scalar()
            .is_some_and(|s| s.is_empty() || s.starts_with(AI_SUMMARY_PREFIX)),
    }
}

/// Set the summary of `note` in memory.
///
/// Returns the outcome with status `Written` or `Skipped`; the caller
/// decides whether to persist.
pub fn apply_summary(note: &mut Note, text: &str) -> Result<SummaryOutcome, NotegraphError> {
    let existing = note.frontmatter.get(SUMMARY_PROPERTY).cloned();
    let old_summary = existing
        .as_ref()
        .map(|v| v.as_strings().join(", "))
        .filter(|s| !s.is_empty());

    if !is_replaceable(existing.as_ref()) {
        return Ok(SummaryOutcome {
            file: note.display_path(),
            status: SummaryStatus::Skipped,
            reason: Some(format!(
                "human-written summary exists (does not start with {AI_SUMMARY_PREFIX})"
            )),
            old_summary,
            new_summary: None,
        });
    }

    let new_summary = ai_summary(text);
    note.frontmatter
        .set_scalar(SUMMARY_PROPERTY, &quoted(&new_summary))
        .map_err(|defect| note.malformed(defect))?;

    Ok(SummaryOutcome {
        file: note.display_path(),
        status: SummaryStatus::Written,
        reason: None,
        old_summary,
        new_summary: Some(new_summary),
    })
}

/// Load `root/relative`, set its summary and write it back unless `dry_run`.
pub fn set_summary(
    root: &Path,
    relative: &Path,
    text: &str,
    dry_run: bool,
) -> Result<SummaryOutcome, NotegraphError> {
    let mut note = Note::load(root, relative)?;
    let mut outcome = apply_summary(&mut note, text)?;
    if outcome.status == SummaryStatus::Written {
        if dry_run {
            outcome.status = SummaryStatus::DryRun;
        } else {
            note.save(root)?;
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn note(text: &str) -> Note {
        Note::parse(PathBuf::from("N.md"), text)
    }

    #[test]
    fn inserts_before_relationship_group_and_escapes() {
        let mut n = note("---\ntitle: T\nRELATED_TO:\n  - \"[[X]]\"\n---\nbody");
        let outcome = apply_summary(&mut n, "Says \"hi\"\nand more").expect("apply");
        assert_eq!(outcome.status, SummaryStatus::Written);
        assert_eq!(outcome.new_summary.as_deref(), Some("[AI] Says \"hi\" and more"));
        assert_eq!(
            n.text(),
            "---\ntitle: T\nsummary: \"[AI] Says \\\"hi\\\" and more\"\nRELATED_TO:\n  - \"[[X]]\"\n---\nbody"
        );
        assert_eq!(
            n.frontmatter.get(SUMMARY_PROPERTY),
            Some(&PropertyValue::Scalar("[AI] Says \"hi\" and more".into()))
        );
    }

    #[test]
    fn replaces_previous_ai_summary_in_place() {
        let mut n = note("---\nsummary: \"[AI] old\"\ntags: [a]\n---\n");
        let outcome = apply_summary(&mut n, "new").expect("apply");
        assert_eq!(outcome.old_summary.as_deref(), Some("[AI] old"));
        assert_eq!(n.text(), "---\nsummary: \"[AI] new\"\ntags: [a]\n---\n");
    }

    #[test]
    fn human_summary_is_kept() {
        let mut n = note("---\nsummary: My own words\n---\n");
        let before = n.text();
        let outcome = apply_summary(&mut n, "machine words").expect("apply");
        assert_eq!(outcome.status, SummaryStatus::Skipped);
        assert!(outcome.reason.is_some());
        assert_eq!(n.text(), before);
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("N.md"), "# Note\n").expect("seed");
        let outcome = set_summary(dir.path(), Path::new("N.md"), "text", true).expect("set");
        assert_eq!(outcome.status, SummaryStatus::DryRun);
        assert_eq!(fs::read_to_string(dir.path().join("N.md")).expect("read"), "# Note\n");

        set_summary(dir.path(), Path::new("N.md"), "text", false).expect("set");
        assert_eq!(
            fs::read_to_string(dir.path().join("N.md")).expect("read"),
            "---\nsummary: \"[AI] text\"\n---\n# Note\n"
        );
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let mut n = note("---\ntitle: x\n");
        let err = apply_summary(&mut n, "text").expect_err("malformed");
        assert!(matches!(err, NotegraphError::MalformedFrontmatter { .. }));
    }
}
