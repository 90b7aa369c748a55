use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fathom", version, about = "Code-graph extraction and queries")]
pub struct Cli {
    /// Emit machine-readable JSON instead of the human summary.
    #[arg(long, global = true)]
    pub json: bool,

    /// Raise log verbosity to debug (stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a tree, parse every recognized file, and build the graph.
    Scan { path: PathBuf },

    /// Parse a single file and print its extraction result.
    Parse { file: PathBuf },

    /// Read-only queries over a freshly built graph.
    Query {
        #[command(subcommand)]
        query: QueryCommand,
    },

    /// Run the configured external linters.
    Lint {
        path: PathBuf,

        /// Apply the linter's auto-fixes before reporting.
        #[arg(long)]
        fix: bool,
    },
}

#[derive(Subcommand)]
pub enum QueryCommand {
    /// Who calls the given symbol (id form: path:line:name).
    Callers {
        root: PathBuf,
        id: String,
        #[arg(long)]
        depth: Option<usize>,
    },
    /// What the given symbol calls.
    Callees {
        root: PathBuf,
        id: String,
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Types structurally satisfying the given interface.
    Implementers { root: PathBuf, id: String },
    /// Call-forest roots matching entry-point heuristics.
    EntryPoints {
        root: PathBuf,
        #[arg(long)]
        package: Option<String>,
    },
    /// Reverse transitive closure over calls and references.
    Impact { root: PathBuf, id: String },
    /// Unexported symbols unreachable from every entry point.
    DeadCode {
        root: PathBuf,
        #[arg(long)]
        scope: Option<String>,
    },
}
