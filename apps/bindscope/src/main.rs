//! # bindscope
//!
//! Command-line inspector for global binding graphs.
//!
//! ## Usage
//!
//! ```bash
//! # Component hierarchy with visible bindings
//! bindscope -g graph.json tree
//!
//! # One component's view
//! bindscope -g graph.json view --path App/Session
//!
//! # Resolve a key inside a component
//! bindscope -g graph.json lookup --path App/Session --type User
//! ```

use bindscope::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // BINDSCOPE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("BINDSCOPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "bindscope=debug,bindscope_core=debug"
    } else {
        "bindscope=info,bindscope_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries command output.
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

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
