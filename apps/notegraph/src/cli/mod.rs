//! # notegraph CLI Module
//!
//! This module implements the CLI interface for notegraph.
//!
//! ## Available Commands
//!
//! - `alias` - Find and resolve links written with a note's alias
//! - `graph` - Traverse the wikilink graph, list neighbors, report link health
//! - `dedupe` - Collapse case-variant duplicate links in list properties
//! - `sync` - Validate and repair symmetric and reversed relationships
//! - `frontmatter` - Parse, search and tally frontmatter properties
//! - `summary` - Write a generated summary into a note
//!
//! Every command prints exactly one JSON document on stdout.

mod commands;

use clap::{Parser, Subcommand};
use notegraph_core::{NotegraphError, Operator, SyncMode};
use serde_json::Value;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// notegraph - wikilink graph and metadata maintenance for markdown vaults
///
/// Reads a vault of interlinked notes, answers graph queries and keeps
/// aliases, duplicate links and relationship properties consistent.
#[derive(Parser, Debug)]
#[command(name = "notegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: <vault>/.notegraph.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip a directory name or vault-relative path (repeatable)
    #[arg(short = 'x', long = "exclude", global = true)]
    pub exclude: Vec<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find and resolve alias links
    #[command(subcommand)]
    Alias(AliasCommand),

    /// Query the wikilink graph
    #[command(subcommand)]
    Graph(GraphCommand),

    /// Remove case-variant duplicate links from frontmatter lists
    #[command(subcommand)]
    Dedupe(DedupeCommand),

    /// Keep relationship properties mutual
    #[command(subcommand)]
    Sync(SyncCommand),

    /// Parse and query frontmatter
    #[command(subcommand)]
    Frontmatter(FrontmatterCommand),

    /// Write generated summaries
    #[command(subcommand)]
    Summary(SummaryCommand),
}

#[derive(Subcommand, Debug)]
pub enum AliasCommand {
    /// Report alias links across the vault
    Scan {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Rewrite alias links across the vault
    Fix {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Report alias links in one file
    Check { file: PathBuf },
    /// Rewrite alias links in one file
    Resolve { file: PathBuf },
    /// List the alias table
    Aliases {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommand {
    /// Breadth-first traversal from a note
    Traverse {
        /// Starting note name (without .md)
        start_note: String,
        /// Number of hops
        hops: usize,
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Dump the whole graph
    #[command(name = "graph")]
    Dump {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Direct neighbors of a note
    Neighbors {
        note: String,
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Orphan, isolated and unresolved-link report
    Health {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum DedupeCommand {
    /// Report duplicates across the vault
    Scan {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Remove duplicates across the vault
    Fix {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Report duplicates in one file
    Check { file: PathBuf },
    /// Remove duplicates in one file
    Dedupe { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Report missing back-links
    Validate {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Add missing back-links
    Sync {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Report missing back-links for links from one file
    Check { file: PathBuf },
    /// Normalize one file and add the back-links it is owed
    Fix { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum FrontmatterCommand {
    /// Show the frontmatter of one file
    Parse { file: PathBuf },
    /// Find notes by property value
    Search {
        directory: PathBuf,
        property: String,
        value: String,
        /// eq, contains, gte or lte
        #[arg(short, long, default_value = "contains")]
        operator: Operator,
    },
    /// Tally the values of a property
    Values { directory: PathBuf, property: String },
}

#[derive(Subcommand, Debug)]
pub enum SummaryCommand {
    /// Store `[AI] <text>` as the note's summary
    Set {
        file: PathBuf,
        text: String,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

// =============================================================================
// COMMAND DISPATCH
// =============================================================================

/// Execute the CLI command and return its JSON document.
pub fn execute(cli: &Cli) -> Result<Value, NotegraphError> {
    let ctx = Context::new(cli.config.clone(), cli.exclude.clone());

    match &cli.command {
        Commands::Alias(cmd) => match cmd {
            AliasCommand::Scan { directory } => cmd_alias_scan(&ctx, directory, false),
            AliasCommand::Fix { directory } => cmd_alias_scan(&ctx, directory, true),
            AliasCommand::Check { file } => cmd_alias_check(&ctx, file, false),
            AliasCommand::Resolve { file } => cmd_alias_check(&ctx, file, true),
            AliasCommand::Aliases { directory } => cmd_alias_list(&ctx, directory),
        },
        Commands::Graph(cmd) => match cmd {
            GraphCommand::Traverse {
                start_note,
                hops,
                directory,
            } => cmd_traverse(&ctx, directory, start_note, *hops),
            GraphCommand::Dump { directory } => cmd_graph(&ctx, directory),
            GraphCommand::Neighbors { note, directory } => cmd_neighbors(&ctx, directory, note),
            GraphCommand::Health { directory } => cmd_health(&ctx, directory),
        },
        Commands::Dedupe(cmd) => match cmd {
            DedupeCommand::Scan { directory } => cmd_dedupe_scan(&ctx, directory, false),
            DedupeCommand::Fix { directory } => cmd_dedupe_scan(&ctx, directory, true),
            DedupeCommand::Check { file } => cmd_dedupe_file(file, false),
            DedupeCommand::Dedupe { file } => cmd_dedupe_file(file, true),
        },
        Commands::Sync(cmd) => match cmd {
            SyncCommand::Validate { directory } => cmd_sync(&ctx, directory, SyncMode::Validate),
            SyncCommand::Sync { directory } => cmd_sync(&ctx, directory, SyncMode::Sync),
            SyncCommand::Check { file } => cmd_sync_file(&ctx, file, SyncMode::Validate),
            SyncCommand::Fix { file } => cmd_sync_file(&ctx, file, SyncMode::Sync),
        },
        Commands::Frontmatter(cmd) => match cmd {
            FrontmatterCommand::Parse { file } => cmd_parse(file),
            FrontmatterCommand::Search {
                directory,
                property,
                value,
                operator,
            } => cmd_search(&ctx, directory, property, value, *operator),
            FrontmatterCommand::Values {
                directory,
                property,
            } => cmd_values(&ctx, directory, property),
        },
        Commands::Summary(SummaryCommand::Set {
            file,
            text,
            dry_run,
        }) => cmd_summary_set(file, text, *dry_run),
    }
}
