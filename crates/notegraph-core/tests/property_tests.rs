//! # Property-Based Tests
//!
//! Invariants of the extractor, the frontmatter store, the deduplicator and
//! the traversal, checked with proptest.

use notegraph_core::{Frontmatter, Note, NoteGraph, Vault, dedupe_list, wikilink};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Note names: words separated by single spaces, no surrounding whitespace.
fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,8}( [A-Za-z0-9]{1,5}){0,2}"
}

fn property_line() -> impl Strategy<Value = String> {
    prop_oneof![
        ("[a-y]{1,8}", "[a-z0-9]{0,8}").prop_map(|(k, v)| format!("{k}: {v}")),
        ("[a-y]{1,8}", vec("[a-z0-9]{1,6}", 1..4)).prop_map(|(k, items)| {
            let mut s = format!("{k}:");
            for item in items {
                s.push_str("\n  - ");
                s.push_str(&item);
            }
            s
        }),
        Just("# comment".to_string()),
    ]
}

fn note_text() -> impl Strategy<Value = String> {
    (vec(property_line(), 0..6), "[a-z .\n]{0,40}").prop_map(|(lines, body)| {
        let mut text = String::from("---\n");
        for line in lines {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str("---\n");
        text.push_str(&body);
        text
    })
}

fn vault_with_edges(size: usize, edges: &[(usize, usize)]) -> Vault {
    let notes = (0..size)
        .map(|i| {
            let body: String = edges
                .iter()
                .filter(|(from, _)| *from == i)
                .map(|(_, to)| format!("[[N{to}]] "))
                .collect();
            Note::parse(PathBuf::from(format!("N{i}.md")), &body)
        })
        .collect();
    Vault::from_notes(PathBuf::from("."), notes, Vec::new())
}

// =============================================================================
// WIKILINK EXTRACTION
// =============================================================================

proptest! {
    /// Every link form yields the bare target.
    #[test]
    fn every_form_yields_the_target(
        target in name(),
        section in "[A-Za-z0-9]{1,8}",
        display in "[A-Za-z0-9]{1,8}",
    ) {
        let forms = [
            (format!("[[{target}]]"), None, None),
            (format!("[[{target}|{display}]]"), None, Some(display.clone())),
            (format!("[[{target}#{section}]]"), Some(section.clone()), None),
            (format!("[[{target}#{section}|{display}]]"), Some(section.clone()), Some(display.clone())),
        ];
        for (raw, want_section, want_display) in forms {
            let links: Vec<_> = wikilink::extract(&raw).collect();
            prop_assert_eq!(links.len(), 1);
            prop_assert_eq!(&links[0].target, &target);
            prop_assert_eq!(&links[0].section, &want_section);
            prop_assert_eq!(&links[0].display, &want_display);
            prop_assert_eq!(&links[0].raw, &raw);
        }
    }

    /// Re-extracting from the raw matches reproduces the same links.
    #[test]
    fn extraction_is_idempotent(targets in vec(name(), 0..8), filler in "[a-z ]{0,10}") {
        let text: String = targets
            .iter()
            .map(|t| format!("{filler}[[{t}]]"))
            .collect();
        let first: Vec<_> = wikilink::extract(&text).map(|l| l.raw).collect();
        let rejoined = first.concat();
        let second: Vec<_> = wikilink::extract(&rejoined).map(|l| l.raw).collect();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(wikilink::targets(&text), targets);
    }
}

// =============================================================================
// FRONTMATTER STORE
// =============================================================================

proptest! {
    /// Splitting and rendering without edits is byte-identical.
    #[test]
    fn render_round_trip(text in note_text()) {
        let (frontmatter, body) = Frontmatter::split(&text);
        prop_assert_eq!(frontmatter.render(&body), text);
    }

    /// Adding one property leaves every other line untouched.
    #[test]
    fn unrelated_edit_preserves_other_lines(text in note_text()) {
        let (mut frontmatter, body) = Frontmatter::split(&text);
        let changed = frontmatter.set_scalar("zzz_new", "1").expect("well formed");
        prop_assert!(changed);
        let edited = frontmatter.render(&body);
        prop_assert_eq!(edited.replacen("zzz_new: 1\n", "", 1), text);
    }
}

// =============================================================================
// DEDUPLICATION
// =============================================================================

proptest! {
    /// A deduplicated list has nothing left to remove and keeps every key.
    #[test]
    fn dedupe_is_idempotent(
        entries in vec(prop::sample::select(vec!["[[ml]]", "[[ML]]", "[[Ml]]", "[[ai]]", "[[AI]]", "[[x]]", "plain"]), 0..12)
    ) {
        let entries: Vec<String> = entries.into_iter().map(String::from).collect();
        let once = dedupe_list(&entries);
        let twice = dedupe_list(&once.after);
        prop_assert!(twice.removed.is_empty());
        prop_assert_eq!(&twice.after, &once.after);
        prop_assert_eq!(once.after.len() + once.removed.len(), entries.len());

        let keys = |list: &[String]| -> BTreeSet<String> {
            list.iter()
                .filter_map(|e| wikilink::extract(e).next())
                .map(|l| l.target.to_lowercase())
                .collect()
        };
        prop_assert_eq!(keys(&once.after), keys(&entries));
    }
}

// =============================================================================
// TRAVERSAL
// =============================================================================

proptest! {
    /// Two builds of the same vault traverse identically; each note is
    /// discovered once and levels are contiguous.
    #[test]
    fn bfs_is_deterministic(
        size in 1usize..12,
        raw_edges in vec((0usize..12, 0usize..12), 0..30),
        hops in 0usize..6,
    ) {
        let edges: Vec<(usize, usize)> = raw_edges
            .into_iter()
            .filter(|(a, b)| *a < size && *b < size)
            .collect();
        let v1 = vault_with_edges(size, &edges);
        let v2 = vault_with_edges(size, &edges);

        let t1 = NoteGraph::build(&v1).bfs(&v1, "N0", hops).expect("start exists");
        let t2 = NoteGraph::build(&v2).bfs(&v2, "N0", hops).expect("start exists");
        prop_assert_eq!(&t1, &t2);

        let listed: Vec<&String> = t1.levels.iter().flat_map(|l| l.notes.iter().map(|n| &n.name)).collect();
        let unique: BTreeSet<&String> = listed.iter().copied().collect();
        prop_assert_eq!(listed.len(), unique.len());
        prop_assert_eq!(listed.len(), t1.total_notes_discovered);
        prop_assert!(t1.total_notes_discovered <= size);
        for (i, level) in t1.levels.iter().enumerate() {
            prop_assert_eq!(level.hop, i);
            prop_assert!(level.hop <= hops);
        }
    }
}
