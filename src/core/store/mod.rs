//! Secret store boundary.
//!
//! The provisioner talks to a store only through the [`SecretStore`] trait,
//! which mirrors the handful of requests a cloud secret manager exposes.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `vault.rs`)
//! 3. Add a `StoreConfig` variant and wire it into [`open`]

use std::path::Path;

use tracing::info;

use crate::core::config::StoreConfig;
use crate::core::domain::{NewSecret, SecretRecord, SecretValue};
use crate::core::types::{SecretId, Tags, VersionId};
use crate::error::Result;

mod fs;
mod ledger;
mod memory;

#[cfg(feature = "aws")]
pub mod aws;

pub use fs::Filesystem;
pub use memory::MemoryStore;

/// Secret store trait.
///
/// Every method is one blocking request to the store.
pub trait SecretStore {
    /// Backend name for display.
    fn name(&self) -> &'static str;

    /// Look up a secret's metadata by name.
    ///
    /// Returns `None` if no secret with that name exists, including secrets
    /// already purged. Secrets inside their recovery window are returned with
    /// `deleted_at` set.
    fn describe(&self, name: &str) -> Result<Option<SecretRecord>>;

    /// Create an empty secret container.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the name belongs to a secret pending
    /// deletion, `StoreError::AlreadyExists` if it belongs to a live one.
    fn create_secret(&self, secret: &NewSecret) -> Result<SecretId>;

    /// Replace a secret's description and tags.
    fn update_secret(&self, id: &str, description: &str, tags: &Tags) -> Result<()>;

    /// Attach a new version holding `value` and mark it current.
    fn put_secret_value(&self, id: &str, value: &SecretValue) -> Result<VersionId>;

    /// Read the current version and its value.
    fn current_value(&self, id: &str) -> Result<Option<(VersionId, SecretValue)>>;

    /// Delete a secret. A zero window purges it immediately.
    fn delete_secret(&self, id: &str, recovery_window_days: u32) -> Result<()>;
}

/// Open the store described by `config`.
///
/// Relative file store paths resolve against `base_dir`.
///
/// # Errors
///
/// Returns `ConfigError::BackendUnavailable` if the backend was not compiled in.
pub fn open(config: &StoreConfig, base_dir: &Path) -> Result<Box<dyn SecretStore>> {
    match config {
        StoreConfig::File { path } => {
            let path = base_dir.join(path);
            info!(path = %path.display(), "using file store");
            Ok(Box::new(Filesystem::new(path)))
        }
        #[cfg(feature = "aws")]
        StoreConfig::Aws {
            region,
            profile,
            endpoint_url,
        } => {
            info!("using AWS Secrets Manager store");
            let settings = aws::AwsSettings {
                region: region.clone(),
                profile: profile.clone(),
                endpoint_url: endpoint_url.clone(),
            };
            Ok(Box::new(aws::AwsSecretsManager::connect(&settings)?))
        }
        #[cfg(not(feature = "aws"))]
        StoreConfig::Aws { .. } => Err(crate::error::ConfigError::BackendUnavailable("aws").into()),
    }
}
