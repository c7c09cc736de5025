//! In-memory secret store for tests and embedding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::ledger::Ledger;
use super::SecretStore;
use crate::core::domain::{NewSecret, SecretRecord, SecretValue};
use crate::core::types::{SecretId, Tags, VersionId};
use crate::error::{Result, StoreError};

/// In-process store. Nothing survives the process.
///
/// Counts every trait call so callers can assert that no request reached
/// the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store requests served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of versions ever attached to the named secret.
    pub fn version_count(&self, name: &str) -> usize {
        self.ledger
            .lock()
            .map(|ledger| ledger.version_count(name))
            .unwrap_or(0)
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        ledger.purge_expired(Utc::now());
        Ok(ledger)
    }
}

impl SecretStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn describe(&self, name: &str) -> Result<Option<SecretRecord>> {
        Ok(self.ledger()?.describe(name))
    }

    fn create_secret(&self, secret: &NewSecret) -> Result<SecretId> {
        self.ledger()?.create(secret)
    }

    fn update_secret(&self, id: &str, description: &str, tags: &Tags) -> Result<()> {
        self.ledger()?.update(id, description, tags)
    }

    fn put_secret_value(&self, id: &str, value: &SecretValue) -> Result<VersionId> {
        self.ledger()?.put_value(id, value)
    }

    fn current_value(&self, id: &str) -> Result<Option<(VersionId, SecretValue)>> {
        self.ledger()?.current_value(id)
    }

    fn delete_secret(&self, id: &str, recovery_window_days: u32) -> Result<()> {
        self.ledger()?.delete(id, recovery_window_days, Utc::now())
    }
}
