//! fathom CLI — multi-language symbol extraction and code-graph queries.
//!
//! Subcommands: `scan` (walk + parse + build graph), `parse` (one file),
//! `query` (callers/callees/implementers/entry-points/impact/dead-code),
//! and `lint` (external linters with policy). See `fathom --help`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod commands;

use cli_args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Scan { ref path } => commands::scan::run(path, cli.json),
        Commands::Parse { ref file } => commands::parse::run(file, cli.json),
        Commands::Query { ref query } => commands::query::run(query, cli.json),
        Commands::Lint { ref path, fix } => commands::lint::run(path, fix, cli.json),
    };
    std::process::exit(exit_code);
}
