//! Core types, errors, hashing, and configuration for fathom.
//!
//! This crate provides the foundational data structures used across all
//! fathom crates:
//! - [`types`] — Symbols, call sites, imports, parse results
//! - [`error`] — The [`ParseError`](error::ParseError) and
//!   [`LintError`](error::LintError) taxonomies
//! - [`hash`] — Content hashing (SHA-256) and cache keys (xxhash64)
//! - [`config`] — Configuration loading from `.fathom/fathom.json`
//! - [`metrics`] — In-process histograms (parse/lint durations, counts)

pub mod config;
pub mod error;
pub mod hash;
pub mod metrics;
pub mod types;
