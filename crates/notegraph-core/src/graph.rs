//! # Vault Graph
//!
//! Directed graph of notes connected by resolved wikilinks.
//!
//! - Nodes are the notes of a [`Vault`], in the vault's sorted order
//! - Adjacency is deduplicated per (source, target) pair; `edge_count`
//!   counts every resolved link occurrence
//! - Links that resolve to no note are tracked apart from the graph
//! - Traversal is bounded by [`MAX_TRAVERSAL_DEPTH`]

use crate::NotegraphError;
use crate::primitives::MAX_TRAVERSAL_DEPTH;
use crate::vault::Vault;
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// One note reached by a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversedNote {
    pub name: String,
    pub path: String,
    /// Full outgoing list of the note, not only the edges walked.
    pub outgoing_links: Vec<String>,
}

/// All notes first discovered at one hop distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalLevel {
    pub hop: usize,
    pub notes: Vec<TraversedNote>,
}

/// Result of a breadth-first traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traversal {
    pub start_note: String,
    pub max_hops: usize,
    pub total_notes_discovered: usize,
    pub levels: Vec<TraversalLevel>,
    /// Every discovered note, sorted case-insensitively.
    pub all_discovered_notes: Vec<String>,
}

/// Direct neighbors of one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub note: String,
    pub path: String,
    pub outgoing_links: Vec<String>,
    pub incoming_links: Vec<String>,
    pub total_connections: usize,
}

/// A link whose target is neither a note name nor an alias.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnresolvedLink {
    pub source: String,
    pub target: String,
}

/// Link-health classification of a vault.
///
/// Orphan and dead-end mean the same thing here (no outgoing edges) and are
/// reported once, as `orphans`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub orphans: Vec<String>,
    pub isolated: Vec<String>,
    pub unresolved: Vec<UnresolvedLink>,
}

// =============================================================================
// GRAPH
// =============================================================================

/// A node of the graph, indices into [`NoteGraph::nodes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub path: String,
    pub outgoing: Vec<usize>,
    pub incoming: Vec<usize>,
}

/// Adjacency tables built from a vault.
#[derive(Debug, Clone)]
pub struct NoteGraph {
    nodes: Vec<GraphNode>,
    edge_count: usize,
    unresolved: Vec<UnresolvedLink>,
}

impl NoteGraph {
    /// Build the graph. Links resolve by note name first, then by alias.
    #[must_use]
    pub fn build(vault: &Vault) -> Self {
        let mut nodes: Vec<GraphNode> = vault
            .notes()
            .iter()
            .map(|n| GraphNode {
                name: n.note.name.clone(),
                path: n.note.display_path(),
                outgoing: Vec::new(),
                incoming: Vec::new(),
            })
            .collect();

        let mut edge_count = 0usize;
        let mut unresolved = BTreeSet::new();

        for (source, entry) in vault.notes().iter().enumerate() {
            let mut targets = BTreeSet::new();
            for link in &entry.links {
                match vault.resolve(&link.target) {
                    Some(target) => {
                        edge_count = edge_count.saturating_add(1);
                        targets.insert(target);
                    }
                    None => {
                        unresolved.insert((link.key(), source, link.target.clone()));
                    }
                }
            }
            if let Some(node) = nodes.get_mut(source) {
                node.outgoing = targets.into_iter().collect();
            }
        }

        let edges: Vec<(usize, usize)> = nodes
            .iter()
            .enumerate()
            .flat_map(|(source, node)| node.outgoing.iter().map(move |&target| (source, target)))
            .collect();
        for (source, target) in edges {
            if let Some(node) = nodes.get_mut(target) {
                node.incoming.push(source);
            }
        }

        // One entry per (source, target key).
        let mut seen = BTreeSet::new();
        let mut unresolved: Vec<UnresolvedLink> = unresolved
            .into_iter()
            .filter(|(key, source, _)| seen.insert((*source, key.clone())))
            .filter_map(|(_, source, target)| {
                nodes.get(source).map(|node| UnresolvedLink {
                    source: node.name.clone(),
                    target,
                })
            })
            .collect();
        unresolved.sort_by(|a, b| {
            (a.source.to_lowercase(), a.target.to_lowercase())
                .cmp(&(b.source.to_lowercase(), b.target.to_lowercase()))
        });

        Self {
            nodes,
            edge_count,
            unresolved,
        }
    }

    /// All nodes, in the vault's sorted order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Number of resolved link occurrences.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Names of the notes at `indices`.
    #[must_use]
    pub fn names(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| self.nodes.get(i).map(|n| n.name.clone()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // QUERIES
    // -------------------------------------------------------------------------

    /// Breadth-first traversal from `start` up to `max_hops` inclusive.
    ///
    /// Each note appears once, at its shallowest depth. Within a level notes
    /// keep discovery order, which follows the sorted adjacency lists. The
    /// walk stops early when a level discovers nothing new.
    pub fn bfs(&self, vault: &Vault, start: &str, max_hops: usize) -> Result<Traversal, NotegraphError> {
        let start = vault.require(start)?;
        let max_hops = max_hops.min(MAX_TRAVERSAL_DEPTH);

        let mut visited = BTreeSet::new();
        visited.insert(start);
        let mut levels = Vec::new();
        let mut current = vec![start];

        for hop in 0..=max_hops {
            let mut next = Vec::new();
            let mut notes = Vec::with_capacity(current.len());
            for &idx in &current {
                let Some(node) = self.nodes.get(idx) else {
                    continue;
                };
                notes.push(TraversedNote {
                    name: node.name.clone(),
                    path: node.path.clone(),
                    outgoing_links: self.names(&node.outgoing),
                });
                if hop < max_hops {
                    for &neighbor in &node.outgoing {
                        if visited.insert(neighbor) {
                            next.push(neighbor);
                        }
                    }
                }
            }
            levels.push(TraversalLevel { hop, notes });
            if next.is_empty() {
                break;
            }
            current = next;
        }

        let discovered: Vec<usize> = visited.into_iter().collect();
        Ok(Traversal {
            start_note: self.names(&[start]).concat(),
            max_hops,
            total_notes_discovered: discovered.len(),
            levels,
            all_discovered_notes: self.names(&discovered),
        })
    }

    /// Outgoing and incoming neighbors of `note`. No traversal.
    pub fn neighbors(&self, vault: &Vault, note: &str) -> Result<Neighbors, NotegraphError> {
        let node = vault
            .require(note)
            .and_then(|idx| {
                self.nodes
                    .get(idx)
                    .ok_or_else(|| NotegraphError::NoteNotFound(note.to_string()))
            })?;
        let outgoing_links = self.names(&node.outgoing);
        let incoming_links = self.names(&node.incoming);
        Ok(Neighbors {
            note: node.name.clone(),
            path: node.path.clone(),
            total_connections: outgoing_links.len().saturating_add(incoming_links.len()),
            outgoing_links,
            incoming_links,
        })
    }

    /// Orphan, isolated and unresolved classification in one pass.
    #[must_use]
    pub fn classify(&self) -> Health {
        let mut orphans = Vec::new();
        let mut isolated = Vec::new();
        for node in &self.nodes {
            if node.outgoing.is_empty() {
                orphans.push(node.name.clone());
                if node.incoming.is_empty() {
                    isolated.push(node.name.clone());
                }
            }
        }
        Health {
            orphans,
            isolated,
            unresolved: self.unresolved.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
