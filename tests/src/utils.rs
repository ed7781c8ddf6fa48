#![cfg(test)]
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use progwall_common::config::Config;
use progwall_common::target::ExecutableTarget;
use progwall_core::resolver::PathResolver;
use tempfile::TempDir;

pub const GROUP: &str = "PS-SetProgramRule";

/// A scratch directory populated with empty files.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn with_files(files: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent dirs");
            }
            File::create(&path).expect("create fixture file");
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    pub fn resolve(&self) -> Vec<ExecutableTarget> {
        PathResolver::from_config(&Config::default())
            .resolve(self.root())
            .expect("resolve fixture root")
    }
}
