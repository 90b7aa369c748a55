use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fathom_core::config::FathomConfig;
use fathom_core::metrics::Metrics;
use fathom_parsers::batch::parse_paths;
use fathom_parsers::cache::ParseCache;
use fathom_parsers::registry::default_registry;

use super::{EXIT_ERROR, EXIT_OK};

pub fn run(file: &Path, json: bool) -> i32 {
    let config = FathomConfig::load(file.parent().unwrap_or(Path::new(".")));
    let registry = default_registry(config.parser.clone());
    let cache = ParseCache::new();
    let metrics = Arc::new(Metrics::new());

    let outcomes = parse_paths(
        &registry,
        &cache,
        &metrics,
        &CancellationToken::new(),
        &[file.to_path_buf()],
    );
    let Some(outcome) = outcomes.into_iter().next() else {
        return EXIT_ERROR;
    };
    match outcome.result {
        Ok(result) => {
            if json {
                match serde_json::to_string_pretty(&result) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(e) => {
                        eprintln!("fathom: failed to render result: {e}");
                        return EXIT_ERROR;
                    }
                }
            } else {
                println!(
                    "{}: {} symbols, {} imports, {} parse errors",
                    result.file_path,
                    result.symbol_count(),
                    result.imports.len(),
                    result.errors.len(),
                );
                for symbol in &result.symbols {
                    println!("  {} {} @{}", symbol.kind, symbol.name, symbol.start_line);
                }
            }
            EXIT_OK
        }
        Err(e) => {
            eprintln!("fathom: {}: {e}", file.display());
            EXIT_ERROR
        }
    }
}
