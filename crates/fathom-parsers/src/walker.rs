use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use fathom_core::types::Language;

pub struct WalkEntry {
    pub path: PathBuf,
    pub language: Language,
}

/// Walks a source tree and returns recognized files, honoring gitignore
/// and `.fathomignore`.
pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn walk(&self) -> Vec<WalkEntry> {
        let mut entries = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .add_custom_ignore_filename(".fathomignore")
            .build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if is_vendored(&path) {
                continue;
            }
            if let Some(language) = Language::from_path(&path) {
                entries.push(WalkEntry { path, language });
            }
        }

        // Deterministic input order for deterministic graph builds.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// Third-party trees that are never part of the caller's own source.
fn is_vendored(path: &Path) -> bool {
    path.components().any(|c| {
        matches!(
            c.as_os_str().to_str(),
            Some("vendor") | Some("node_modules")
        )
    })
}
