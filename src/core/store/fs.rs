//! Filesystem-backed secret store.
//!
//! Persists a [`Ledger`] as JSON, by default at `.ferry/secrets.json` next to
//! the config file. Intended for local development and CI dry runs; payloads
//! are stored in plaintext, so the file is restricted to its owner.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::ledger::Ledger;
use super::SecretStore;
use crate::core::domain::{NewSecret, SecretRecord, SecretValue};
use crate::core::types::{SecretId, Tags, VersionId};
use crate::error::{Result, StoreError};

/// JSON ledger on local disk.
#[derive(Debug, Clone)]
pub struct Filesystem {
    path: PathBuf,
}

impl Filesystem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::new());
        }

        #[cfg(unix)]
        warn_on_loose_permissions(&self.path);

        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::ReadFailed {
            path: self.path.clone(),
            source,
        })?;
        let mut ledger: Ledger =
            serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        ledger.purge_expired(Utc::now());

        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let write_err = |source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(ledger).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, format!("{}\n", contents)).map_err(write_err)?;

        // Restrict permissions before the ledger becomes visible (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)).map_err(write_err)?;
        }

        fs::rename(&tmp, &self.path).map_err(write_err)?;
        debug!(path = %self.path.display(), "store saved");

        Ok(())
    }

    /// Load, apply `f`, and save the ledger.
    fn update<T>(&self, f: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let mut ledger = self.load()?;
        let out = f(&mut ledger)?;
        self.save(&ledger)?;
        Ok(out)
    }
}

#[cfg(unix)]
fn warn_on_loose_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode != 0o600 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode),
                "insecure store file permissions"
            );
        }
    }
}

impl SecretStore for Filesystem {
    fn name(&self) -> &'static str {
        "file"
    }

    fn describe(&self, name: &str) -> Result<Option<SecretRecord>> {
        Ok(self.load()?.describe(name))
    }

    fn create_secret(&self, secret: &NewSecret) -> Result<SecretId> {
        self.update(|ledger| ledger.create(secret))
    }

    fn update_secret(&self, id: &str, description: &str, tags: &Tags) -> Result<()> {
        self.update(|ledger| ledger.update(id, description, tags))
    }

    fn put_secret_value(&self, id: &str, value: &SecretValue) -> Result<VersionId> {
        self.update(|ledger| ledger.put_value(id, value))
    }

    fn current_value(&self, id: &str) -> Result<Option<(VersionId, SecretValue)>> {
        self.load()?.current_value(id)
    }

    fn delete_secret(&self, id: &str, recovery_window_days: u32) -> Result<()> {
        self.update(|ledger| ledger.delete(id, recovery_window_days, Utc::now()))
    }
}
