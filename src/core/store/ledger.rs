//! Secret bookkeeping shared by the local store backends.
//!
//! A `Ledger` holds every secret with its full version history and
//! implements the store semantics: creation, version attachment, recovery
//! windows and purging. `MemoryStore` keeps one behind a mutex; `Filesystem`
//! serializes it to JSON between calls.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::domain::{NewSecret, SecretRecord, SecretValue};
use crate::core::types::{SecretId, SecretName, Tags, VersionId};
use crate::error::{Result, StoreError};

/// One immutable payload snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVersion {
    id: VersionId,
    value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    #[serde(flatten)]
    record: SecretRecord,
    #[serde(default)]
    versions: Vec<StoredVersion>,
}

/// All secrets of a local store, keyed by name.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    secrets: BTreeMap<SecretName, Entry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop secrets whose recovery window has elapsed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.secrets.retain(|name, entry| {
            let expired = entry.record.purge_at.is_some_and(|at| at <= now);
            if expired {
                debug!(name = %name, "purging secret after recovery window");
            }
            !expired
        });
    }

    pub fn describe(&self, name: &str) -> Option<SecretRecord> {
        self.secrets.get(name).map(|e| e.record.clone())
    }

    pub fn create(&mut self, secret: &NewSecret) -> Result<SecretId> {
        if let Some(existing) = self.secrets.get(&secret.name) {
            if let Some(purge_at) = existing.record.purge_at {
                return Err(StoreError::Conflict {
                    name: secret.name.clone(),
                    purge_at: purge_at.to_rfc3339(),
                }
                .into());
            }
            return Err(StoreError::AlreadyExists(secret.name.clone()).into());
        }

        let id = uuid::Uuid::new_v4().to_string();
        let record = SecretRecord {
            id: id.clone(),
            name: secret.name.clone(),
            description: secret.description.clone(),
            tags: secret.tags.clone(),
            current_version: None,
            deleted_at: None,
            purge_at: None,
        };

        self.secrets.insert(
            secret.name.clone(),
            Entry {
                record,
                versions: Vec::new(),
            },
        );

        Ok(id)
    }

    pub fn update(&mut self, id: &str, description: &str, tags: &Tags) -> Result<()> {
        let entry = self.live_entry_mut(id)?;
        entry.record.description = description.to_string();
        entry.record.tags = tags.clone();
        Ok(())
    }

    pub fn put_value(&mut self, id: &str, value: &SecretValue) -> Result<VersionId> {
        let entry = self.live_entry_mut(id)?;
        let version_id = uuid::Uuid::new_v4().to_string();

        entry.versions.push(StoredVersion {
            id: version_id.clone(),
            value: value.expose().to_string(),
        });
        entry.record.current_version = Some(version_id.clone());

        Ok(version_id)
    }

    pub fn current_value(&self, id: &str) -> Result<Option<(VersionId, SecretValue)>> {
        let entry = self.entry(id)?;
        let current = entry.record.current_version.as_ref().and_then(|current| {
            entry
                .versions
                .iter()
                .find(|v| &v.id == current)
                .map(|v| (v.id.clone(), SecretValue::new(v.value.clone())))
        });
        Ok(current)
    }

    /// Delete a secret, immediately for a zero window or after the window.
    ///
    /// Deleting a secret already inside its window leaves the original
    /// purge date in place.
    pub fn delete(&mut self, id: &str, recovery_window_days: u32, now: DateTime<Utc>) -> Result<()> {
        let name = self.entry(id)?.record.name.clone();

        if recovery_window_days == 0 {
            self.secrets.remove(&name);
            return Ok(());
        }

        if let Some(entry) = self.secrets.get_mut(&name) {
            if entry.record.deleted_at.is_none() {
                entry.record.deleted_at = Some(now);
                entry.record.purge_at = Some(now + Duration::days(i64::from(recovery_window_days)));
            }
        }

        Ok(())
    }

    /// Number of versions ever attached to a secret.
    pub fn version_count(&self, name: &str) -> usize {
        self.secrets.get(name).map_or(0, |e| e.versions.len())
    }

    fn entry(&self, id: &str) -> Result<&Entry> {
        self.secrets
            .values()
            .find(|e| e.record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    fn live_entry_mut(&mut self, id: &str) -> Result<&mut Entry> {
        let entry = self
            .secrets
            .values_mut()
            .find(|e| e.record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(purge_at) = entry.record.purge_at {
            return Err(StoreError::Conflict {
                name: entry.record.name.clone(),
                purge_at: purge_at.to_rfc3339(),
            }
            .into());
        }

        Ok(entry)
    }
}
