//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every `cmd_*` function scans what it needs, runs one engine operation and
//! returns the JSON document to print. Nothing here writes to stdout.

use crate::config::Config;
use crate::report::{
    AliasListing, Batch, FileAliasReport, FileDedupeReport, FileScoped, GraphReport, ParseReport,
    SearchReport, ValuesReport,
};
use notegraph_core::note::display_path;
use notegraph_core::{
    FileError, Note, NoteGraph, NotegraphError, Operator, SyncMode, SyncRules, Vault, alias,
    dedupe, find_vault_root, search, summary, sync, wikilink,
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

// =============================================================================
// CONTEXT
// =============================================================================

/// Global flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    config: Option<PathBuf>,
    exclude: Vec<String>,
}

/// A single file together with the vault it belongs to.
#[derive(Debug)]
pub struct OpenFile {
    pub vault: Vault,
    pub config: Config,
    /// Path relative to `vault.root()`.
    pub relative: PathBuf,
}

impl Context {
    pub fn new(config: Option<PathBuf>, exclude: Vec<String>) -> Self {
        Self { config, exclude }
    }

    /// Load the configuration for `directory` and scan it.
    pub fn open_vault(&self, directory: &Path) -> Result<(Vault, Config), NotegraphError> {
        let config = Config::discover(self.config.as_deref(), directory)?;
        let vault = Vault::scan(directory, &config.scan_options(&self.exclude))?;
        tracing::debug!(
            root = %directory.display(),
            notes = vault.len(),
            warnings = vault.warnings().len(),
            "Scanned vault"
        );
        for warning in vault.warnings() {
            tracing::warn!(?warning, "Scan warning");
        }
        Ok((vault, config))
    }

    /// Scan the vault `file` lives in.
    pub fn open_file(&self, file: &Path) -> Result<OpenFile, NotegraphError> {
        let (root, relative) = locate(file)?;
        let (vault, config) = self.open_vault(&root)?;
        Ok(OpenFile {
            vault,
            config,
            relative,
        })
    }
}

/// Vault root and root-relative path of an existing file.
fn locate(file: &Path) -> Result<(PathBuf, PathBuf), NotegraphError> {
    if !file.is_file() {
        return Err(NotegraphError::IoError(format!(
            "File not found: {}",
            file.display()
        )));
    }
    let root = find_vault_root(file)?;
    let relative = std::path::absolute(file)
        .ok()
        .and_then(|abs| abs.strip_prefix(&root).ok().map(Path::to_path_buf))
        .ok_or_else(|| {
            NotegraphError::IoError(format!("{} is outside {}", file.display(), root.display()))
        })?;
    tracing::debug!(root = %root.display(), file = %relative.display(), "Located vault root");
    Ok((root, relative))
}

/// Load a note that is about to be mutated, refusing malformed frontmatter.
fn load_mutable(root: &Path, relative: &Path) -> Result<Note, NotegraphError> {
    let note = Note::load(root, relative)?;
    match note.frontmatter.defects().into_iter().next() {
        Some(defect) => Err(note.malformed(defect)),
        None => Ok(note),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, NotegraphError> {
    serde_json::to_value(value).map_err(|e| NotegraphError::SerializationError(e.to_string()))
}

fn log_file_errors(errors: &[FileError]) {
    for e in errors {
        tracing::warn!(file = %e.file, error = %e.error, "File skipped");
    }
}

// =============================================================================
// ALIAS COMMANDS
// =============================================================================

/// `alias scan` / `alias fix`.
pub fn cmd_alias_scan(ctx: &Context, directory: &Path, fix: bool) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let report = alias::run(&vault, fix);
    log_file_errors(&report.errors);
    tracing::info!(
        files = report.files_with_alias_links,
        occurrences = report.total_occurrences,
        fix,
        "Alias pass complete"
    );
    to_json(&Batch::new(report, &vault))
}

/// `alias check` / `alias resolve` on one file.
pub fn cmd_alias_check(ctx: &Context, file: &Path, fix: bool) -> Result<Value, NotegraphError> {
    let open = ctx.open_file(file)?;
    let note = Note::load(open.vault.root(), &open.relative)?;
    let occurrences = if fix {
        alias::resolve_note(&open.vault, &note)?
    } else {
        alias::check_note(&open.vault, &note)
    };
    let fixed = fix && !occurrences.is_empty();
    if fixed {
        tracing::info!("Rewrote {} alias link(s) in {}", occurrences.len(), note.display_path());
    }
    to_json(&FileAliasReport {
        file: note.display_path(),
        count: occurrences.len(),
        fixed,
        occurrences,
    })
}

/// `alias aliases`.
pub fn cmd_alias_list(ctx: &Context, directory: &Path) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    to_json(&AliasListing::from_vault(&vault))
}

// =============================================================================
// GRAPH COMMANDS
// =============================================================================

/// `graph traverse`.
pub fn cmd_traverse(
    ctx: &Context,
    directory: &Path,
    start_note: &str,
    hops: usize,
) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let graph = NoteGraph::build(&vault);
    let traversal = graph.bfs(&vault, start_note, hops)?;
    tracing::info!(
        start = %traversal.start_note,
        discovered = traversal.total_notes_discovered,
        "Traversal complete"
    );
    to_json(&traversal)
}

/// `graph graph`.
pub fn cmd_graph(ctx: &Context, directory: &Path) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let graph = NoteGraph::build(&vault);
    let report = GraphReport::from_graph(&graph);
    tracing::info!(notes = report.total_notes, edges = report.total_edges, "Graph built");
    to_json(&Batch::new(report, &vault))
}

/// `graph neighbors`.
pub fn cmd_neighbors(ctx: &Context, directory: &Path, note: &str) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let graph = NoteGraph::build(&vault);
    to_json(&graph.neighbors(&vault, note)?)
}

/// `graph health`.
pub fn cmd_health(ctx: &Context, directory: &Path) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let health = NoteGraph::build(&vault).classify();
    for link in &health.unresolved {
        tracing::debug!(source = %link.source, target = %link.target, "Unresolved link");
    }
    tracing::info!(
        orphans = health.orphans.len(),
        isolated = health.isolated.len(),
        unresolved = health.unresolved.len(),
        "Health check complete"
    );
    to_json(&Batch::new(health, &vault))
}

// =============================================================================
// DEDUPE COMMANDS
// =============================================================================

/// `dedupe scan` / `dedupe fix`.
pub fn cmd_dedupe_scan(ctx: &Context, directory: &Path, fix: bool) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let report = dedupe::run(&vault, fix);
    log_file_errors(&report.errors);
    tracing::info!(
        files = report.files_with_duplicates,
        duplicates = report.total_duplicates_found,
        fix,
        "Dedupe pass complete"
    );
    to_json(&Batch::new(report, &vault))
}

/// `dedupe check` / `dedupe dedupe` on one file.
pub fn cmd_dedupe_file(file: &Path, fix: bool) -> Result<Value, NotegraphError> {
    let (root, relative) = locate(file)?;
    let mut note = load_mutable(&root, &relative)?;
    let properties = if fix {
        dedupe::dedupe_note(&mut note, &root)?
    } else {
        dedupe::check_note(&note)
    };
    let duplicates_found = properties.values().map(|r| r.removed.len()).sum();
    to_json(&FileDedupeReport {
        file: note.display_path(),
        duplicates_found,
        fixed: fix && duplicates_found > 0,
        properties,
    })
}

// =============================================================================
// SYNC COMMANDS
// =============================================================================

/// Log relationship targets that name no note. They are never issues.
fn log_placeholders(vault: &Vault, rules: &SyncRules) {
    let properties = rules.properties();
    for entry in vault.notes().iter().filter(|n| !n.malformed) {
        for property in &properties {
            let Some(value) = entry.note.frontmatter.get(property) else {
                continue;
            };
            for target in value.as_strings().iter().flat_map(|s| wikilink::targets(s)) {
                if vault.resolve(&target).is_none() {
                    tracing::debug!(
                        source = %entry.note.name,
                        property = %property,
                        target = %target,
                        "Placeholder target skipped"
                    );
                }
            }
        }
    }
}

/// `sync validate` / `sync sync`.
pub fn cmd_sync(ctx: &Context, directory: &Path, mode: SyncMode) -> Result<Value, NotegraphError> {
    let (vault, config) = ctx.open_vault(directory)?;
    let rules = config.sync_rules();
    log_placeholders(&vault, &rules);
    let report = sync::run(&vault, &rules, mode, None);
    log_file_errors(&report.errors);
    tracing::info!(
        issues = report.total_issues,
        fixed = report.fixed,
        normalized = report.normalized_files.len(),
        "Sync pass complete"
    );
    to_json(&Batch::new(report, &vault))
}

/// `sync check` / `sync fix` for links whose source is one file.
pub fn cmd_sync_file(ctx: &Context, file: &Path, mode: SyncMode) -> Result<Value, NotegraphError> {
    let open = ctx.open_file(file)?;
    let idx = open
        .vault
        .position_by_path(&open.relative)
        .ok_or_else(|| NotegraphError::NoteNotFound(display_path(&open.relative)))?;
    load_mutable(open.vault.root(), &open.relative)?;

    let rules = open.config.sync_rules();
    let report = sync::run(&open.vault, &rules, mode, Some(idx));
    log_file_errors(&report.errors);
    to_json(&FileScoped {
        file: display_path(&open.relative),
        report,
    })
}

// =============================================================================
// FRONTMATTER COMMANDS
// =============================================================================

/// `frontmatter parse`.
pub fn cmd_parse(file: &Path) -> Result<Value, NotegraphError> {
    let (root, relative) = locate(file)?;
    let note = Note::load(&root, &relative)?;
    to_json(&ParseReport::from_note(&note))
}

/// `frontmatter search`.
pub fn cmd_search(
    ctx: &Context,
    directory: &Path,
    property: &str,
    value: &str,
    operator: Operator,
) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let hits = search::search(&vault, property, value, operator);
    tracing::info!("Search {} {} {:?}: {} match(es)", property, operator, value, hits.len());
    to_json(&Batch::new(SearchReport::new(hits), &vault))
}

/// `frontmatter values`.
pub fn cmd_values(ctx: &Context, directory: &Path, property: &str) -> Result<Value, NotegraphError> {
    let (vault, _) = ctx.open_vault(directory)?;
    let values = search::values(&vault, property);
    let report = ValuesReport {
        property: property.to_string(),
        unique_count: values.len(),
        values,
    };
    to_json(&Batch::new(report, &vault))
}

// =============================================================================
// SUMMARY COMMANDS
// =============================================================================

/// `summary set`.
pub fn cmd_summary_set(file: &Path, text: &str, dry_run: bool) -> Result<Value, NotegraphError> {
    let (root, relative) = locate(file)?;
    let outcome = summary::set_summary(&root, &relative, text, dry_run)?;
    tracing::info!(file = %outcome.file, status = ?outcome.status, "Summary write-back");
    to_json(&outcome)
}
