//! # notegraph
//!
//! The main binary for notegraph: wikilink graph, alias, dedupe and
//! relationship maintenance for a vault of markdown notes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          apps/notegraph (THE BINARY)        │
//! │                                             │
//! │  ┌─────────┐  ┌──────────┐  ┌───────────┐   │
//! │  │   CLI   │  │  config  │  │  reports  │   │
//! │  │ (clap)  │  │  (toml)  │  │  (json)   │   │
//! │  └────┬────┘  └────┬─────┘  └─────┬─────┘   │
//! │       └────────────┼──────────────┘         │
//! │                    ▼                        │
//! │           ┌────────────────┐                │
//! │           │ notegraph-core │                │
//! │           │  (THE ENGINE)  │                │
//! │           └────────────────┘                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! notegraph graph traverse "Machine Learning" 2 ~/vault
//! notegraph sync validate ~/vault
//! notegraph alias fix ~/vault
//! notegraph frontmatter search ~/vault status draft --operator eq
//! ```
//!
//! Stdout carries exactly one JSON document. Logs go to stderr.

use clap::Parser;
use notegraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // NOTEGRAPH_LOG_FORMAT=json enables machine-parseable logs.
    let log_format = std::env::var("NOTEGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_level = if cli.verbose { "notegraph=debug" } else { "notegraph=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    match cli::execute(&cli) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
        Err(e) => {
            tracing::error!("Error: {}", e);
            let output = serde_json::json!({ "error": e.to_string() });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            std::process::exit(1);
        }
    }
}
