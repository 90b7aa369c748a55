//! Language front-ends for fathom.
//!
//! Each front-end implements the [`Parser`](parser::Parser) contract:
//! bytes in, a validated [`ParseResult`](fathom_core::types::ParseResult)
//! out. The [`registry`] dispatches by language tag or file extension, the
//! [`batch`] module parses file sets in parallel, and [`walker`] walks a
//! source tree honoring ignore files.

pub mod bash;
pub mod batch;
pub mod cache;
pub mod calls;
pub mod css;
pub mod dockerfile;
pub mod ecma;
pub mod go;
pub mod html;
pub mod javascript;
pub mod markdown;
pub mod parser;
pub mod python;
pub mod registry;
pub mod treesitter;
pub mod typescript;
pub mod walker;
pub mod yaml;

pub use parser::Parser;
pub use registry::{default_registry, ParserRegistry};
