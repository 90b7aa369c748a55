//! Error taxonomies for parsing and linting.
//!
//! Complete per-file failures surface as a [`ParseError`]; lesser
//! conditions (error subtrees, unrecognized nodes, failed field reads)
//! accumulate as strings in `ParseResult.errors` instead.

/// Errors that abort a single parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("parse canceled")]
    Canceled,

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("content is not valid UTF-8: {0}")]
    InvalidContent(String),

    /// The CST library itself failed to produce a tree. Distinct from a
    /// tree containing error nodes, which is a partial success.
    #[error("parser failed to produce a syntax tree")]
    ParseFailed,

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },
}

impl ParseError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ParseError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// True for cancellation, which propagates unchanged through every layer.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ParseError::Canceled)
    }
}

/// Errors from the external lint runner.
///
/// A recognized language with no installed binary is NOT an error; it
/// produces a `LintResult` with `linter_available = false`.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("lint canceled")]
    Canceled,

    #[error("no linter configured for language: {0}")]
    UnsupportedLanguage(String),

    #[error("{linter} timed out after {timeout_ms} ms: {stderr}")]
    Timeout {
        linter: String,
        timeout_ms: u64,
        stderr: String,
    },

    #[error("failed to execute {linter}: {message}")]
    ExecFailed { linter: String, message: String },

    #[error("failed to parse {linter} output: {message}")]
    ParseOutput { linter: String, message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
