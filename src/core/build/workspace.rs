//! Build Workspace guard.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BuildError, Result};

/// An exclusively owned staging directory.
///
/// Dropping the guard removes the directory. [`Workspace::remove`] does the
/// same but reports failure.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    armed: bool,
}

impl Workspace {
    /// Create an empty workspace directory.
    ///
    /// # Errors
    ///
    /// Fails if anything already exists at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(BuildError::io("create", parent))?;
        }
        fs::create_dir(path).map_err(BuildError::io("create", path))?;

        debug!(path = %path.display(), "workspace created");
        Ok(Self {
            path: path.to_path_buf(),
            armed: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the workspace and everything in it.
    pub fn remove(mut self) -> Result<()> {
        self.armed = false;
        fs::remove_dir_all(&self.path).map_err(BuildError::io("remove", &self.path))?;
        debug!(path = %self.path.display(), "workspace removed");
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove workspace"),
        }
    }
}
