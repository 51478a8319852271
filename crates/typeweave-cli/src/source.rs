//! Local checkout as a repository source.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use typeweave_core::{RepoSource, Result, TypeweaveError};

/// A repository on the local filesystem.
///
/// Honors `.gitignore`, skips hidden entries and any directory whose name is
/// in `exclude_dirs`.
pub struct LocalRepoSource {
    root: PathBuf,
    exclude_dirs: Vec<String>,
}

impl LocalRepoSource {
    pub fn new(root: impl Into<PathBuf>, exclude_dirs: Vec<String>) -> Self {
        Self {
            root: root.into(),
            exclude_dirs,
        }
    }

    /// Repository name: the final component of the root directory.
    pub fn name(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.root.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        relative.components().any(|c| {
            let part = c.as_os_str().to_string_lossy();
            self.exclude_dirs.iter().any(|d| d.as_str() == part)
        })
    }
}

impl RepoSource for LocalRepoSource {
    fn list_files(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(TypeweaveError::Listing(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| TypeweaveError::Listing(e.to_string()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if self.is_excluded(relative) {
                continue;
            }
            let parts: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            files.push(parts.join("/"));
        }

        files.sort();
        Ok(files)
    }

    fn read_file(&self, path: &str) -> Result<String> {
        fs::read_to_string(self.root.join(path)).map_err(|e| TypeweaveError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn file_size(&self, path: &str) -> Option<u64> {
        fs::metadata(self.root.join(path)).ok().map(|m| m.len())
    }
}
