//! # Report Types
//!
//! JSON documents printed by commands whose shape is not already a core
//! result type. Core reports (`AliasReport`, `Traversal`, `SyncReport`, ...)
//! are printed as they are, wrapped in [`Batch`] when they cover a vault.

use notegraph_core::{
    AliasOccurrence, DedupeResult, Note, NoteGraph, PropertyValue, ScanWarning, SearchHit, Vault,
    wikilink,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// WRAPPERS
// =============================================================================

/// A vault-wide report with the scan's warnings appended.
#[derive(Debug, Clone, Serialize)]
pub struct Batch<T: Serialize> {
    #[serde(flatten)]
    pub report: T,
    pub warnings: Vec<ScanWarning>,
}

impl<T: Serialize> Batch<T> {
    pub fn new(report: T, vault: &Vault) -> Self {
        Self {
            report,
            warnings: vault.warnings().to_vec(),
        }
    }
}

/// A report scoped to one file of a vault.
#[derive(Debug, Clone, Serialize)]
pub struct FileScoped<T: Serialize> {
    pub file: String,
    #[serde(flatten)]
    pub report: T,
}

/// Alias links in one file, and whether they were rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAliasReport {
    pub file: String,
    pub count: usize,
    pub fixed: bool,
    pub occurrences: Vec<AliasOccurrence>,
}

/// Duplicate links in one file, and whether they were removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDedupeReport {
    pub file: String,
    pub duplicates_found: usize,
    pub fixed: bool,
    pub properties: BTreeMap<String, DedupeResult>,
}

// =============================================================================
// GRAPH
// =============================================================================

/// One entry of [`GraphReport::graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEntry {
    pub path: String,
    pub outgoing: Vec<String>,
    pub incoming: Vec<String>,
}

/// The whole graph with its counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphReport {
    pub total_notes: usize,
    pub total_edges: usize,
    pub orphan_notes_count: usize,
    pub isolated_notes_count: usize,
    pub graph: BTreeMap<String, GraphEntry>,
}

impl GraphReport {
    #[must_use]
    pub fn from_graph(graph: &NoteGraph) -> Self {
        let health = graph.classify();
        let entries = graph
            .nodes()
            .iter()
            .map(|node| {
                (
                    node.name.clone(),
                    GraphEntry {
                        path: node.path.clone(),
                        outgoing: graph.names(&node.outgoing),
                        incoming: graph.names(&node.incoming),
                    },
                )
            })
            .collect();

        Self {
            total_notes: graph.nodes().len(),
            total_edges: graph.edge_count(),
            orphan_notes_count: health.orphans.len(),
            isolated_notes_count: health.isolated.len(),
            graph: entries,
        }
    }
}

// =============================================================================
// FRONTMATTER QUERIES
// =============================================================================

/// Parsed frontmatter of one file, properties in file order.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub file: String,
    pub properties: Map<String, Value>,
    pub body_links: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defects: Vec<String>,
}

impl ParseReport {
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        let properties = note
            .frontmatter
            .properties()
            .map(|p| (p.name.clone(), property_json(&p.value)))
            .collect();
        Self {
            file: note.display_path(),
            properties,
            body_links: wikilink::targets(&note.body),
            defects: note
                .frontmatter
                .defects()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// A property value as JSON: string, array of strings or null.
#[must_use]
pub fn property_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Scalar(s) => Value::String(s.clone()),
        PropertyValue::List(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        PropertyValue::Absent => Value::Null,
    }
}

/// Matches of a property search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    pub count: usize,
    pub results: Vec<SearchHit>,
}

impl SearchReport {
    #[must_use]
    pub fn new(results: Vec<SearchHit>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Distinct values of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuesReport {
    pub property: String,
    pub unique_count: usize,
    /// `[value, count]` pairs.
    pub values: Vec<(String, usize)>,
}

// =============================================================================
// ALIASES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedAlias {
    pub alias: String,
    pub actual_note: String,
}

/// The alias table of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasListing {
    pub total_aliases: usize,
    pub aliases: Vec<ListedAlias>,
    /// `AliasConflict` warnings only.
    pub conflicts: Vec<ScanWarning>,
}

impl AliasListing {
    #[must_use]
    pub fn from_vault(vault: &Vault) -> Self {
        let aliases: Vec<ListedAlias> = vault
            .aliases()
            .map(|(_, entry)| ListedAlias {
                alias: entry.alias.clone(),
                actual_note: entry.note.clone(),
            })
            .collect();
        let conflicts = vault
            .warnings()
            .iter()
            .filter(|w| matches!(w, ScanWarning::AliasConflict { .. }))
            .cloned()
            .collect();
        Self {
            total_aliases: aliases.len(),
            aliases,
            conflicts,
        }
    }
}
