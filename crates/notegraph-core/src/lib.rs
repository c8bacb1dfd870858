//! # notegraph-core
//!
//! The note-graph and metadata synchronization engine for notegraph.
//!
//! This crate reads a vault of interlinked markdown notes and answers
//! questions about it, or repairs it:
//! - YAML frontmatter is read and edited line by line, never re-serialized
//! - wikilinks are extracted from frontmatter and body alike
//! - the vault index builds name, alias and link tables per invocation
//! - graph queries, alias resolution, deduplication and relationship sync
//!   all consume that index
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no async, no network, no global state
//! - Deterministic: every listing is ordered (`BTreeMap`, sorted notes)
//! - No logging: non-fatal findings are returned as data
//! - Every write is atomic per file (temp file, then rename)

// =============================================================================
// MODULES
// =============================================================================

pub mod alias;
pub mod dedupe;
pub mod frontmatter;
pub mod graph;
pub mod note;
pub mod primitives;
pub mod search;
pub mod summary;
pub mod sync;
pub mod types;
pub mod vault;
pub mod wikilink;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{FileError, FrontmatterDefect, NoteKey, NotegraphError, PropertyValue, ScanWarning};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use alias::{AliasOccurrence, AliasReport, OccurrenceKind};
pub use dedupe::{DedupeReport, DedupeResult, dedupe_list};
pub use frontmatter::{BlockState, Frontmatter};
pub use graph::{Health, Neighbors, NoteGraph, Traversal};
pub use note::Note;
pub use search::{Operator, SearchHit};
pub use summary::{SummaryOutcome, SummaryStatus};
pub use sync::{IssueKind, SyncIssue, SyncMode, SyncReport, SyncRules};
pub use vault::{ScanOptions, Vault, find_vault_root};
pub use wikilink::{TextEdit, Wikilink};
