//! # notegraph
//!
//! The command layer of the notegraph binary, exposed as a library so it can
//! be tested without spawning processes.
//!
//! - `cli` - argument parsing and the `cmd_*` command functions
//! - `config` - `.notegraph.toml` loading
//! - `report` - JSON shapes printed by commands

pub mod cli;
pub mod config;
pub mod report;
