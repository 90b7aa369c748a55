use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fathom_core::config::FathomConfig;
use fathom_core::metrics::Metrics;
use fathom_lint::{LintResult, LintRunner};

use super::{EXIT_ERROR, EXIT_FINDINGS, EXIT_OK};

pub fn run(path: &Path, fix: bool, json: bool) -> i32 {
    if !path.exists() {
        eprintln!("fathom: path does not exist: {}", path.display());
        return EXIT_ERROR;
    }
    let config = FathomConfig::load(if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    });
    let runner = LintRunner::new(&config, Arc::new(Metrics::new()));
    let ctx = CancellationToken::new();

    let results: Vec<(String, Result<LintResult, fathom_core::error::LintError>)> =
        if path.is_dir() {
            runner
                .lint_directory(&ctx, path)
                .into_iter()
                .map(|(p, r)| (p.display().to_string(), r))
                .collect()
        } else if fix {
            vec![(path.display().to_string(), runner.auto_fix(&ctx, path))]
        } else {
            vec![(path.display().to_string(), runner.lint(&ctx, path))]
        };

    let mut exit = EXIT_OK;
    let mut rendered: Vec<LintResult> = Vec::new();
    for (file, outcome) in results {
        match outcome {
            Ok(result) => {
                if !result.valid {
                    exit = EXIT_FINDINGS;
                }
                if !json {
                    print_human(&result);
                }
                rendered.push(result);
            }
            Err(e) => {
                eprintln!("fathom: {file}: {e}");
                exit = EXIT_ERROR;
            }
        }
    }
    if json {
        match serde_json::to_string_pretty(&rendered) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("fathom: failed to render results: {e}"),
        }
    }
    exit
}

fn print_human(result: &LintResult) {
    if !result.linter_available {
        println!(
            "{}: {} not installed, skipped",
            result.file_path, result.linter
        );
        return;
    }
    println!(
        "{}: {} errors, {} warnings ({} ms, {})",
        result.file_path,
        result.errors.len(),
        result.warnings.len(),
        result.duration_ms,
        result.linter,
    );
    for issue in result.errors.iter().chain(&result.warnings) {
        println!(
            "  {}:{}:{} {} [{}] {}",
            issue.file, issue.line, issue.column, issue.severity.as_str(), issue.rule, issue.message
        );
    }
}
