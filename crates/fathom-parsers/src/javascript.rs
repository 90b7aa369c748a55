//! JavaScript front-end (`.js`, `.jsx`, `.mjs`, `.cjs`).
//!
//! Shares the [`crate::ecma`] walker with the TypeScript front-end; the
//! JS grammar simply never produces the TS-only shapes.

use tokio_util::sync::CancellationToken;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Language, ParseResult};

use crate::ecma::EcmaWalker;
use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{collect_syntax_errors, parse_source};

pub struct JavaScriptParser {
    limits: ParserLimits,
}

impl JavaScriptParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for JavaScriptParser {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_javascript::LANGUAGE.into(), input.source)?;
        let bytes = input.source.as_bytes();

        let mut errors = collect_syntax_errors(tree.root_node(), bytes);
        let walker = EcmaWalker::new(ctx, bytes, file_path, Language::JavaScript, &self.limits);
        let extraction = walker.extract(tree.root_node())?;
        errors.extend(extraction.errors);

        finish(
            ctx,
            file_path,
            Language::JavaScript,
            input.hash,
            extraction.symbols,
            extraction.imports,
            errors,
        )
    }
}
