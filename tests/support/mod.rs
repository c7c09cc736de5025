//! Test support utilities for ferry integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Test environment with an isolated project directory.
///
/// Child processes use `.current_dir()` so tests can run in parallel.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with a config holding only `[store]` and `[secret]`.
    pub fn with_secret() -> Self {
        let t = Self::new();
        t.write("ferry.toml", SECRET_CONFIG);
        t
    }

    /// Create a test environment with function sources, a fake installer and
    /// a full config.
    #[cfg(unix)]
    pub fn with_project(requirements: &str) -> Self {
        let t = Self::new();
        t.write_sources(requirements);
        let pip = t.fake_pip();
        t.write("ferry.toml", &build_config(&pip));
        t
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file relative to the project root, creating parents.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(path, contents).expect("failed to write file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("failed to read file")
    }

    /// Lay out a function under `lambda/`.
    pub fn write_sources(&self, requirements: &str) {
        self.write("lambda/index.py", HANDLER_SOURCE);
        self.write("lambda/events/__init__.py", "");
        self.write("lambda/events/s3.py", "def parse(record): return record\n");
        self.write("lambda/services/__init__.py", "");
        self.write("lambda/utils/__init__.py", "");
        self.write("lambda/requirements.txt", requirements);
    }

    /// Install an executable stand-in for pip and return its path.
    #[cfg(unix)]
    pub fn fake_pip(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path("bin/fake-pip");
        self.write("bin/fake-pip", FAKE_PIP_SCRIPT);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fake pip");
        path
    }

    /// Current secret value as recorded in the local file store.
    pub fn stored_value(&self, name: &str) -> String {
        let ledger: serde_json::Value =
            serde_json::from_str(&self.read(".ferry/secrets.json")).expect("invalid store JSON");
        ledger["secrets"][name]["versions"]
            .as_array()
            .and_then(|v| v.last())
            .and_then(|v| v["value"].as_str())
            .expect("no stored version")
            .to_string()
    }

    /// Names of the entries in a zip archive.
    pub fn zip_entries(&self, rel: &str) -> Vec<String> {
        zip_entries(&self.path(rel))
    }
}

/// Names of the entries in a zip archive.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("failed to open archive");
    let mut zip = zip::ZipArchive::new(file).expect("invalid archive");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("bad entry").name().to_string())
        .collect()
}
