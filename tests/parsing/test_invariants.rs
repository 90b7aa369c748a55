use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::common::parse_file;
use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{symbol_id, Symbol, SymbolKind};
use fathom_parsers::registry::default_registry;

/// One representative source per front-end.
fn corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        ("main.go", "package main\n\nfunc main() { run() }\nfunc run() {}\n"),
        ("app.py", "\"\"\"App.\"\"\"\n\nclass Task:\n    def go(self):\n        pass\n"),
        ("svc.ts", "export interface R { read(): string; }\nexport class F implements R { read(): string { return \"\"; } }\n"),
        ("ui.js", "const render = () => 1;\nfunction mount() { render(); }\n"),
        ("styles.css", ".a { color: red; }\n@keyframes spin { from {} to {} }\n"),
        ("page.html", "<div id=\"root\"></div><my-tag></my-tag>"),
        ("ci.yaml", "jobs:\n  build:\n    steps: 3\n"),
        ("README.md", "# Title\n\n```sh\nmake\n```\n"),
        ("Dockerfile", "FROM alpine:3.20 AS base\nEXPOSE 80\n"),
        ("run.sh", "setup() {\n  true\n}\nMODE=fast\n"),
    ]
}

fn each_symbol(symbols: &[Symbol], check: &mut dyn FnMut(&Symbol)) {
    for symbol in symbols {
        check(symbol);
        each_symbol(&symbol.children, check);
    }
}

#[test]
fn test_every_result_validates() {
    for (path, source) in corpus() {
        let result = parse_file(path, source);
        assert!(result.validate().is_ok(), "{path} failed validation");
        assert_eq!(result.content_hash.len(), 64, "{path}");
        assert!(result.content_hash.bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(result.parsed_at_milli > 0);
        assert!(!result.symbols.is_empty(), "{path} extracted nothing");
    }
}

#[test]
fn test_symbol_ids_reconstructible() {
    for (path, source) in corpus() {
        let result = parse_file(path, source);
        each_symbol(&result.symbols, &mut |symbol| {
            assert_eq!(
                symbol.id,
                symbol_id(&symbol.file_path, symbol.start_line, &symbol.name),
                "{path}: {}",
                symbol.id
            );
        });
    }
}

#[test]
fn test_ranges_well_formed_and_contained() {
    for (path, source) in corpus() {
        let result = parse_file(path, source);
        each_symbol(&result.symbols, &mut |symbol| {
            assert!(symbol.start_line >= 1, "{path}: {}", symbol.name);
            assert!(symbol.end_line >= symbol.start_line);
            for child in &symbol.children {
                assert!(child.start_line >= symbol.start_line);
                assert!(child.end_line <= symbol.end_line);
            }
        });
    }
}

#[test]
fn test_methods_always_carry_receivers() {
    for (path, source) in corpus() {
        let result = parse_file(path, source);
        each_symbol(&result.symbols, &mut |symbol| {
            if symbol.kind == SymbolKind::Method {
                assert!(!symbol.receiver.is_empty(), "{path}: {}", symbol.name);
            }
        });
    }
}

#[test]
fn test_call_sites_well_formed() {
    for (path, source) in corpus() {
        let result = parse_file(path, source);
        each_symbol(&result.symbols, &mut |symbol| {
            for call in &symbol.calls {
                assert!(!call.target.is_empty(), "{path}: {}", symbol.name);
                assert!(call.location.start_line > 0);
            }
        });
    }
}

#[test]
fn test_kind_strings_round_trip() {
    for (path, source) in corpus() {
        let result = parse_file(path, source);
        each_symbol(&result.symbols, &mut |symbol| {
            assert_eq!(SymbolKind::parse(symbol.kind.as_str()), symbol.kind, "{path}");
        });
    }
}

#[test]
fn test_cancellation_before_parse() {
    let registry = default_registry(ParserLimits::default());
    let ctx = CancellationToken::new();
    ctx.cancel();
    for (path, source) in corpus() {
        let parser = registry.get_for_path(Path::new(path)).unwrap();
        let err = parser.parse(&ctx, source.as_bytes(), path);
        assert!(matches!(err, Err(ParseError::Canceled)), "{path}");
    }
}

#[test]
fn test_oversize_rejected_for_every_parser() {
    let limits = ParserLimits {
        max_file_size: 8,
        ..ParserLimits::default()
    };
    let registry = default_registry(limits);
    for (path, source) in corpus() {
        let parser = registry.get_for_path(Path::new(path)).unwrap();
        let err = parser.parse(&CancellationToken::new(), source.as_bytes(), path);
        assert!(matches!(err, Err(ParseError::TooLarge { .. })), "{path}");
    }
}

#[test]
fn test_invalid_utf8_rejected() {
    let registry = default_registry(ParserLimits::default());
    let parser = registry.get_for_path(Path::new("x.go")).unwrap();
    let err = parser.parse(&CancellationToken::new(), &[0x80, 0x81], "x.go");
    assert!(matches!(err, Err(ParseError::InvalidContent(_))));
}

#[test]
fn test_traversal_paths_rejected() {
    let result = parse_file("main.go", "package main\nfunc main() {}\n");
    assert!(result.validate().is_ok());

    let registry = default_registry(ParserLimits::default());
    let parser = registry.get_for_path(Path::new("x.go")).unwrap();
    let err = parser.parse(
        &CancellationToken::new(),
        b"package main\nfunc main() {}\n",
        "../escape.go",
    );
    assert!(matches!(err, Err(ParseError::Validation { .. })));
}
