//! The parser contract and the shared front-door guard.
//!
//! Every language front-end goes through the same sequence: cancellation
//! check, size cap, UTF-8 check, content hash, grammar parse, extraction,
//! a second cancellation check, and validation. The guard half of that
//! sequence lives here so the front-ends only implement extraction.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::hash::content_hash;
use fathom_core::types::{Import, Language, ParseResult, Symbol};

/// The core abstraction every language front-end implements.
///
/// Implementors must be `Send + Sync` and safe for concurrent invocation:
/// each `parse` call instantiates its own CST parser and shares no mutable
/// state with other calls.
pub trait Parser: Send + Sync {
    /// The language tag this front-end produces.
    fn language(&self) -> Language;

    /// File extensions (without dot) this front-end claims.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse one file's bytes into a validated [`ParseResult`].
    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError>;
}

/// Validated input handed to a front-end's extraction phase.
pub struct CheckedInput<'a> {
    pub source: &'a str,
    pub hash: String,
}

/// Front-door checks common to every parser: cancellation, size cap,
/// UTF-8, and the content hash (computed before any transformation).
pub fn check_input<'a>(
    ctx: &CancellationToken,
    content: &'a [u8],
    file_path: &str,
    limits: &ParserLimits,
) -> Result<CheckedInput<'a>, ParseError> {
    if ctx.is_cancelled() {
        return Err(ParseError::Canceled);
    }
    if content.len() > limits.max_file_size {
        return Err(ParseError::TooLarge {
            size: content.len(),
            max: limits.max_file_size,
        });
    }
    if content.len() > limits.warn_file_size {
        tracing::warn!(
            file = file_path,
            size = content.len(),
            "large file, parsing may be slow"
        );
    }
    let source =
        std::str::from_utf8(content).map_err(|e| ParseError::InvalidContent(e.to_string()))?;
    let hash = content_hash(content);
    Ok(CheckedInput { source, hash })
}

/// Assemble and validate the final result. Re-checks cancellation so a
/// parse canceled mid-extraction never returns a partial success.
pub fn finish(
    ctx: &CancellationToken,
    file_path: &str,
    language: Language,
    hash: String,
    symbols: Vec<Symbol>,
    imports: Vec<Import>,
    errors: Vec<String>,
) -> Result<ParseResult, ParseError> {
    if ctx.is_cancelled() {
        return Err(ParseError::Canceled);
    }
    let result = ParseResult {
        file_path: file_path.to_string(),
        language,
        content_hash: hash,
        parsed_at_milli: now_milli(),
        symbols,
        imports,
        errors,
    };
    result.validate()?;
    Ok(result)
}

fn now_milli() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
        .max(1)
}
