//! Temporary repository fixtures.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway directory tree standing in for a checked-out repository.
///
/// Deleted when dropped.
pub struct FixtureRepo {
    dir: TempDir,
}

impl FixtureRepo {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Repository root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` inside the repository.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a text file, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        self.bytes(rel, content.as_bytes())
    }

    /// Write raw bytes, creating parent directories.
    pub fn bytes(&self, rel: &str, content: &[u8]) -> &Self {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("failed to write fixture file");
        self
    }

    /// Create an (empty) directory.
    pub fn dir(&self, rel: &str) -> &Self {
        std::fs::create_dir_all(self.join(rel)).expect("failed to create fixture dir");
        self
    }
}

impl Default for FixtureRepo {
    fn default() -> Self {
        Self::new()
    }
}
