//! Linter availability probing.
//!
//! Each configured binary is probed once with `--version`; the result is
//! cached for the life of the runner. A probe failure just marks the
//! linter unavailable, it never errors.

use std::collections::HashMap;
use std::process::Command;
use std::sync::RwLock;

use crate::config::LinterConfig;

#[derive(Default)]
pub struct LinterDetector {
    available: RwLock<Option<HashMap<String, bool>>>,
}

impl LinterDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe every configured binary and cache the availability bits.
    pub fn detect<'a, I>(&self, configs: I) -> HashMap<String, bool>
    where
        I: IntoIterator<Item = &'a LinterConfig>,
    {
        let mut map = HashMap::new();
        for config in configs {
            if map.contains_key(&config.binary) {
                continue;
            }
            let available = probe(&config.binary);
            tracing::debug!(binary = config.binary.as_str(), available, "linter probe");
            map.insert(config.binary.clone(), available);
        }
        *self.available.write().unwrap() = Some(map.clone());
        map
    }

    /// Availability of one binary; `None` until `detect` has run.
    pub fn is_available(&self, binary: &str) -> Option<bool> {
        self.available
            .read()
            .unwrap()
            .as_ref()
            .map(|m| m.get(binary).copied().unwrap_or(false))
    }

    pub fn detected(&self) -> bool {
        self.available.read().unwrap().is_some()
    }
}

fn probe(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
