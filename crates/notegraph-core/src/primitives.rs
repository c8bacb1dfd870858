//! # Fixed Primitives
//!
//! Hardcoded constants for the notegraph engine.
//!
//! These are compiled into the binary. Anything a user may reasonably want
//! to change (extra excluded directories, relationship rules) is taken from
//! configuration instead and only defaults live here.

/// Directories that are never scanned, wherever they appear under the root.
///
/// Version control, package caches, the host application's config and trash,
/// and the agent/skills configuration directory.
pub const SKIP_DIRS: &[&str] = &[".git", ".obsidian", ".trash", ".claude", "node_modules"];

/// Default file extensions treated as notes.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md"];

/// The frontmatter property holding a note's alternate names.
pub const ALIASES_PROPERTY: &str = "aliases";

/// The frontmatter property the summarization pipeline writes back.
pub const SUMMARY_PROPERTY: &str = "summary";

/// Marker that distinguishes machine-written summaries from human ones.
pub const AI_SUMMARY_PREFIX: &str = "[AI]";

/// Properties that open the "relationship" group of a frontmatter block.
///
/// Newly introduced scalar properties are inserted before the first of
/// these so that human-authored metadata stays above the link lists.
pub const RELATIONSHIP_PROPERTIES: &[&str] = &["TOPIC", "PRIOR", "NEXT", "RELATED_TO"];

/// Default symmetric relationship properties.
pub const DEFAULT_SYMMETRIC_PROPERTIES: &[&str] = &["RELATED_TO"];

/// Default reversed relationship pairs (property -> complement).
pub const DEFAULT_REVERSED_PAIRS: &[(&str, &str)] = &[("NEXT", "PRIOR"), ("PRIOR", "NEXT")];

/// Indentation prefix used when a list item is written into a property
/// that has no existing items to copy the style from.
pub const LIST_ITEM_PREFIX: &str = "  - ";

/// Maximum hop count for BFS traversals.
///
/// All queries must be computationally bounded.
pub const MAX_TRAVERSAL_DEPTH: usize = 100;
