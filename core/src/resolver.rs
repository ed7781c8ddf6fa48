//! # Path Resolution
//!
//! Resolves a user supplied path into the executables it designates: the
//! file itself, or every matching file below a directory.

use std::collections::BTreeSet;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use progwall_common::config::{Config, EXEC_BIT, normalize_extension};
use progwall_common::error::ResolveError;
use progwall_common::target::ExecutableTarget;
use tracing::debug;
use walkdir::WalkDir;

/// Decides which files count as executables.
#[derive(Debug, Clone)]
pub struct ExecutableFilter {
    extensions: BTreeSet<String>,
    exec_bit: bool,
}

impl ExecutableFilter {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let mut set = BTreeSet::new();
        let mut exec_bit = false;
        for ext in extensions {
            let ext = normalize_extension(ext.as_ref());
            if ext == EXEC_BIT {
                exec_bit = true;
            } else if !ext.is_empty() {
                set.insert(ext);
            }
        }
        Self {
            extensions: set,
            exec_bit,
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// `metadata` is only consulted when permission bits are in play.
    pub fn matches<F>(&self, path: &Path, metadata: F) -> bool
    where
        F: FnOnce() -> Option<Metadata>,
    {
        if self.matches_extension(path) {
            return true;
        }
        self.exec_bit && metadata().is_some_and(|meta| has_exec_bit(&meta))
    }
}

#[cfg(unix)]
fn has_exec_bit(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_metadata: &Metadata) -> bool {
    false
}

pub struct PathResolver {
    filter: ExecutableFilter,
}

impl PathResolver {
    pub fn new(filter: ExecutableFilter) -> Self {
        Self { filter }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(ExecutableFilter::new(&cfg.extensions))
    }

    /// Resolves `path` into executable targets.
    ///
    /// An unreadable path is treated as missing. For directories the scan is
    /// recursive and unreadable subtrees are skipped, so the result may be
    /// partial. An empty result is not an error.
    pub fn resolve(&self, path: &Path) -> Result<Vec<ExecutableTarget>, ResolveError> {
        let absolute: PathBuf = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let metadata =
            fs::metadata(&absolute).map_err(|_| ResolveError::PathNotFound(path.to_path_buf()))?;

        if metadata.is_dir() {
            return Ok(self.scan_directory(&absolute));
        }

        if self.filter.matches(&absolute, || Some(metadata)) {
            Ok(vec![ExecutableTarget::new(absolute)])
        } else {
            Err(ResolveError::NotExecutable(path.to_path_buf()))
        }
    }

    fn scan_directory(&self, root: &Path) -> Vec<ExecutableTarget> {
        let mut targets = Vec::new();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("skipping unreadable entry: {e}");
                    continue;
                }
            };

            // Symlinks are not followed into directories, but a link to a
            // file is a target like the file itself.
            let is_link = entry.path_is_symlink();
            if !(entry.file_type().is_file() || is_link && entry.path().is_file()) {
                continue;
            }

            let metadata = || {
                if is_link {
                    fs::metadata(entry.path()).ok()
                } else {
                    entry.metadata().ok()
                }
            };
            if self.filter.matches(entry.path(), metadata) {
                targets.push(ExecutableTarget::new(entry.into_path()));
            }
        }

        debug!("found {} executables under {}", targets.len(), root.display());
        targets
    }
}
