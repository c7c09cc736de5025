//! Secret provisioning.
//!
//! Creates a secret holding a generated token, or reuses the existing one
//! when the generation inputs have not changed. The inputs' fingerprint is
//! kept in the reserved `ferry:generation` tag so any backend that stores
//! tags can answer "did anything change?" without reading the payload.

use tracing::{debug, info};

use crate::core::constants::GENERATION_TAG;
use crate::core::domain::{GenerationSpec, NewSecret, Outcome, SecretHandle, SecretRecord};
use crate::core::store::SecretStore;
use crate::core::types::{SecretName, Tags};
use crate::core::validation;
use crate::error::{Result, StoreError};

/// Everything needed to provision one secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub name: SecretName,
    pub description: String,
    /// Days a deleted secret stays recoverable; zero purges immediately.
    pub recovery_window_days: u32,
    pub tags: Tags,
    pub generation: GenerationSpec,
}

impl ProvisionRequest {
    /// Check every input. Runs before any store call.
    pub fn validate(&self) -> Result<()> {
        validation::validate_name(&self.name)?;
        validation::validate_description(&self.description)?;
        validation::validate_tags(&self.tags)?;
        self.generation.validate()?;
        Ok(())
    }

    /// Caller tags plus the generation fingerprint.
    fn store_tags(&self) -> Tags {
        let mut tags = self.tags.clone();
        tags.insert(GENERATION_TAG.to_string(), self.generation.fingerprint());
        tags
    }
}

fn conflict(record: &SecretRecord) -> StoreError {
    StoreError::Conflict {
        name: record.name.clone(),
        purge_at: record
            .purge_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "an unknown date".to_string()),
    }
}

/// Provision a secret.
///
/// - No secret with this name: create it, store a generated value, outcome
///   `Created`.
/// - Secret exists with the same generation fingerprint and a current value:
///   keep the value, reconcile description and tags if they drifted, outcome
///   `Unchanged`.
/// - Secret exists but the fingerprint differs (or no value was ever stored):
///   attach a newly generated version, outcome `Rotated`.
///
/// # Errors
///
/// Returns `ValidationError` before contacting the store if the request is
/// invalid, and `StoreError::Conflict` if the name belongs to a secret pending
/// deletion.
pub fn provision(store: &dyn SecretStore, request: &ProvisionRequest) -> Result<SecretHandle> {
    request.validate()?;

    let tags = request.store_tags();
    let fingerprint = request.generation.fingerprint();
    debug!(name = %request.name, store = store.name(), fingerprint = %fingerprint, "provisioning secret");

    let Some(record) = store.describe(&request.name)? else {
        let value = request.generation.generate()?;
        let id = store.create_secret(&NewSecret {
            name: request.name.clone(),
            description: request.description.clone(),
            tags,
            recovery_window_days: request.recovery_window_days,
        })?;
        let version_id = store.put_secret_value(&id, &value)?;

        info!(name = %request.name, version = %version_id, "secret created");
        return Ok(SecretHandle {
            name: request.name.clone(),
            id,
            version_id,
            outcome: Outcome::Created,
            value,
        });
    };

    if record.is_pending_deletion() {
        return Err(conflict(&record).into());
    }

    let drifted = record.description != request.description || record.tags != tags;

    let current = if record.tags.get(GENERATION_TAG) == Some(&fingerprint) {
        store.current_value(&record.id)?
    } else {
        None
    };

    if let Some((version_id, value)) = current {
        if drifted {
            debug!(name = %request.name, "updating secret metadata");
            store.update_secret(&record.id, &request.description, &tags)?;
        }

        info!(name = %request.name, version = %version_id, "secret unchanged");
        return Ok(SecretHandle {
            name: request.name.clone(),
            id: record.id,
            version_id,
            outcome: Outcome::Unchanged,
            value,
        });
    }

    // The fingerprint tag must only ever describe a stored value
    let value = request.generation.generate()?;
    let version_id = store.put_secret_value(&record.id, &value)?;
    if drifted {
        store.update_secret(&record.id, &request.description, &tags)?;
    }

    info!(name = %request.name, version = %version_id, "secret rotated");
    Ok(SecretHandle {
        name: request.name.clone(),
        id: record.id,
        version_id,
        outcome: Outcome::Rotated,
        value,
    })
}

/// Delete a provisioned secret.
///
/// Returns `false` if there was nothing to delete. A secret already inside
/// its recovery window is left as it is.
pub fn teardown(store: &dyn SecretStore, name: &str, recovery_window_days: u32) -> Result<bool> {
    validation::validate_name(name)?;

    let Some(record) = store.describe(name)? else {
        debug!(name = %name, "secret does not exist");
        return Ok(false);
    };

    if record.is_pending_deletion() {
        debug!(name = %name, "secret already scheduled for deletion");
        return Ok(false);
    }

    store.delete_secret(&record.id, recovery_window_days)?;
    info!(name = %name, recovery_window_days, "secret deleted");

    Ok(true)
}
