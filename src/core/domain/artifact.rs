//! Artifact handle.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A successfully written deployment archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactHandle {
    path: PathBuf,
    size: u64,
    entries: usize,
    sha256: String,
}

impl ArtifactHandle {
    pub fn new(path: PathBuf, size: u64, entries: usize, sha256: String) -> Self {
        Self {
            path,
            size,
            entries,
            sha256,
        }
    }

    /// Archive location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Archive size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of file and directory entries in the archive.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Hex SHA-256 of the archive bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
