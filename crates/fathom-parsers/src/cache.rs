//! Process-local parse cache.
//!
//! Keyed by (xxh64 of content, language) so a file whose bytes have not
//! changed is never re-parsed within one process. The public SHA-256
//! content hash is unrelated to this key and is stored inside the cached
//! result itself.

use std::collections::HashMap;
use std::sync::Mutex;

use fathom_core::types::{Language, ParseResult};

#[derive(Default)]
pub struct ParseCache {
    entries: Mutex<HashMap<(u64, Language), ParseResult>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u64, language: Language) -> Option<ParseResult> {
        self.entries.lock().unwrap().get(&(key, language)).cloned()
    }

    pub fn insert(&self, key: u64, language: Language, result: ParseResult) {
        self.entries.lock().unwrap().insert((key, language), result);
    }

    pub fn invalidate(&self, key: u64, language: Language) {
        self.entries.lock().unwrap().remove(&(key, language));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
