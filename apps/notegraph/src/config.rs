//! # Configuration
//!
//! Optional per-vault settings read from `.notegraph.toml` (or `--config`).
//!
//! ```toml
//! exclude_dirs = ["archive"]
//! extensions   = ["md"]
//!
//! [relations]
//! symmetric = ["RELATED_TO"]
//!
//! [relations.reversed]
//! NEXT  = "PRIOR"
//! PRIOR = "NEXT"
//! ```
//!
//! Every key is optional. An omitted key keeps the built-in default; an
//! unknown key is an error.

use notegraph_core::primitives::{DEFAULT_REVERSED_PAIRS, DEFAULT_SYMMETRIC_PROPERTIES};
use notegraph_core::{NotegraphError, ScanOptions, SyncRules};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// File name looked up at the vault root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".notegraph.toml";

// =============================================================================
// CONFIG FILE
// =============================================================================

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory names or root-relative paths skipped during scans.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Note extensions, without the dot. Defaults to `md`.
    pub extensions: Option<Vec<String>>,

    /// Relationship invariants enforced by `sync`.
    #[serde(default)]
    pub relations: Relations,
}

/// The `[relations]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Relations {
    /// Properties that must point back with themselves.
    pub symmetric: Option<Vec<String>>,

    /// `property = "complement"` pairs.
    pub reversed: Option<BTreeMap<String, String>>,
}

impl Config {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, NotegraphError> {
        toml::from_str(text).map_err(|e| NotegraphError::ConfigError(e.to_string()))
    }

    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self, NotegraphError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            NotegraphError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
            .map_err(|e| NotegraphError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// The configuration for a command on `vault`.
    ///
    /// An explicit path must exist. Without one, `<vault>/.notegraph.toml`
    /// is used when present, else the defaults.
    pub fn discover(explicit: Option<&Path>, vault: &Path) -> Result<Self, NotegraphError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = vault.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Scan options with `extra_excludes` added to the configured ones.
    #[must_use]
    pub fn scan_options(&self, extra_excludes: &[String]) -> ScanOptions {
        let defaults = ScanOptions::default();
        ScanOptions {
            exclude_dirs: self
                .exclude_dirs
                .iter()
                .chain(extra_excludes)
                .cloned()
                .collect(),
            extensions: self.extensions.as_ref().map_or(defaults.extensions, |exts| {
                exts.iter()
                    .map(|e| e.trim_start_matches('.').to_string())
                    .collect()
            }),
        }
    }

    /// Relationship rules, defaults filled in per key.
    #[must_use]
    pub fn sync_rules(&self) -> SyncRules {
        let symmetric = self.relations.symmetric.clone().unwrap_or_else(|| {
            DEFAULT_SYMMETRIC_PROPERTIES
                .iter()
                .map(|p| (*p).to_string())
                .collect()
        });
        let reversed = self.relations.reversed.clone().unwrap_or_else(|| {
            DEFAULT_REVERSED_PAIRS
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect()
        });
        SyncRules::new(symmetric, reversed)
    }
}

// =============================================================================
// TESTS
// =============================================================================
