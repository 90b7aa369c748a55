//! Parallel parsing of file sets.
//!
//! Front-ends are pure functions of `(ctx, bytes, path)`, so a rayon pool
//! fans the work out. Per-file failures are returned alongside successes;
//! the caller (graph builder, CLI) decides how to surface them. Results
//! come back in input order regardless of completion order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use fathom_core::error::ParseError;
use fathom_core::hash::cache_key;
use fathom_core::metrics::{self, Metrics};
use fathom_core::types::{Language, ParseResult, SymbolKind};

use crate::cache::ParseCache;
use crate::registry::ParserRegistry;

/// Outcome of parsing one file in a batch.
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ParseResult, ParseError>,
}

/// Parse every path in parallel through the registry, consulting and
/// filling `cache`, and recording parse metrics.
pub fn parse_paths(
    registry: &ParserRegistry,
    cache: &ParseCache,
    metrics: &Arc<Metrics>,
    ctx: &CancellationToken,
    paths: &[PathBuf],
) -> Vec<FileOutcome> {
    paths
        .par_iter()
        .map(|path| FileOutcome {
            path: path.clone(),
            result: parse_one(registry, cache, metrics, ctx, path),
        })
        .collect()
}

fn parse_one(
    registry: &ParserRegistry,
    cache: &ParseCache,
    metrics: &Arc<Metrics>,
    ctx: &CancellationToken,
    path: &PathBuf,
) -> Result<ParseResult, ParseError> {
    let parser = registry
        .get_for_path(path)
        .ok_or_else(|| ParseError::UnsupportedLanguage(path.display().to_string()))?;
    let content = std::fs::read(path).map_err(|e| ParseError::InvalidContent(e.to_string()))?;

    let key = cache_key(&content);
    if let Some(hit) = cache.get(key, parser.language()) {
        return Ok(hit);
    }

    let span = tracing::debug_span!("parse", file = %path.display());
    let _guard = span.enter();
    let started = Instant::now();
    let result = parser.parse(ctx, &content, &path.to_string_lossy())?;
    record_parse_metrics(metrics, &result, started);
    cache.insert(key, parser.language(), result.clone());
    Ok(result)
}

fn record_parse_metrics(metrics: &Arc<Metrics>, result: &ParseResult, started: Instant) {
    metrics.record(
        metrics::PARSE_DURATION_MS,
        started.elapsed().as_secs_f64() * 1000.0,
    );
    metrics.record(metrics::SYMBOLS_PER_PARSE, result.symbol_count() as f64);
    if result.language == Language::Python {
        let protocols = result
            .symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Interface)
            .count();
        if protocols > 0 {
            metrics.record(metrics::PROTOCOLS_DETECTED, protocols as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_registry;
    use fathom_core::config::ParserLimits;
    use std::fs;

    #[test]
    fn test_parse_paths_mixed_batch() {
        let dir = tempfile::tempdir().unwrap();
        let go = dir.path().join("main.go");
        let py = dir.path().join("app.py");
        fs::write(&go, "package main\nfunc main() {}\n").unwrap();
        fs::write(&py, "def run():\n    pass\n").unwrap();

        let registry = default_registry(ParserLimits::default());
        let cache = ParseCache::new();
        let metrics = Arc::new(Metrics::new());
        let outcomes = parse_paths(
            &registry,
            &cache,
            &metrics,
            &CancellationToken::new(),
            &[go, py],
        );
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(cache.len(), 2);

        let snap = metrics.snapshot();
        assert_eq!(snap[metrics::PARSE_DURATION_MS].count, 2);
    }

    #[test]
    fn test_parse_paths_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("readme.txt");
        fs::write(&txt, "hello").unwrap();

        let registry = default_registry(ParserLimits::default());
        let cache = ParseCache::new();
        let metrics = Arc::new(Metrics::new());
        let outcomes = parse_paths(
            &registry,
            &cache,
            &metrics,
            &CancellationToken::new(),
            &[txt],
        );
        assert!(matches!(
            outcomes[0].result,
            Err(ParseError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_cache_hit_skips_reparse() {
        let dir = tempfile::tempdir().unwrap();
        let go = dir.path().join("main.go");
        fs::write(&go, "package main\n").unwrap();

        let registry = default_registry(ParserLimits::default());
        let cache = ParseCache::new();
        let metrics = Arc::new(Metrics::new());
        let paths = vec![go];
        parse_paths(&registry, &cache, &metrics, &CancellationToken::new(), &paths);
        parse_paths(&registry, &cache, &metrics, &CancellationToken::new(), &paths);
        // Second pass hits the cache, so only one duration sample exists.
        assert_eq!(metrics.snapshot()[metrics::PARSE_DURATION_MS].count, 1);
    }
}
