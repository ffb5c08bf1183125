//! # bindscope CLI Module
//!
//! ## Available Commands
//!
//! - `tree` - Print the component hierarchy with visible binding keys
//! - `view` - Print the nodes, edges and bindings of one component view
//! - `lookup` - Resolve a key inside a component view
//! - `convert` - Re-encode a graph file as JSON, TOML or binary
//! - `stats` - Node and edge counts by kind

mod commands;

use bindscope_core::GraphError;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// bindscope - component-scoped views over a global binding graph
#[derive(Parser, Debug)]
#[command(name = "bindscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress headers in text output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the graph file
    #[arg(
        short = 'g',
        long,
        global = true,
        env = "BINDSCOPE_GRAPH",
        default_value = "graph.json"
    )]
    pub graph: PathBuf,

    /// Graph file format (inferred from the extension when omitted)
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<GraphFormat>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the component hierarchy
    Tree,

    /// Show one component's view
    View {
        /// Component path, e.g. `App/Session`
        #[arg(short, long)]
        path: String,
    },

    /// Resolve a binding key inside a component's view
    Lookup {
        /// Component path, e.g. `App/Session`
        #[arg(short, long)]
        path: String,

        /// Type name of the key
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Qualifier of the key
        #[arg(long)]
        qualifier: Option<String>,

        /// Look up a members-injection binding instead of a contribution
        #[arg(short, long)]
        members_injection: bool,
    },

    /// Re-encode the graph file
    Convert {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short = 't', long, value_enum)]
        to: GraphFormat,
    },

    /// Node and edge counts by kind
    Stats,
}

/// On-disk encodings of a graph file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Json,
    Toml,
    Binary,
}

impl GraphFormat {
    /// Format implied by a file extension; unknown extensions are binary.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => GraphFormat::Json,
            Some("toml") => GraphFormat::Toml,
            _ => GraphFormat::Binary,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), GraphError> {
    let format = cli
        .format
        .unwrap_or_else(|| GraphFormat::from_path(&cli.graph));
    let output = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
    };

    tracing::debug!(graph = %cli.graph.display(), ?format, "loading graph");
    let graph = load_graph(&cli.graph, format)?;

    match cli.command {
        Some(Commands::Tree) | None => cmd_tree(&graph, output),
        Some(Commands::View { path }) => cmd_view(&graph, output, &path),
        Some(Commands::Lookup {
            path,
            type_name,
            qualifier,
            members_injection,
        }) => cmd_lookup(
            &graph,
            output,
            &path,
            &type_name,
            qualifier,
            members_injection,
        ),
        Some(Commands::Convert { output: dest, to }) => cmd_convert(&graph, &dest, to),
        Some(Commands::Stats) => cmd_stats(&graph, output),
    }
}

// =============================================================================
// TESTS
// =============================================================================
