//! AWS Secrets Manager backend.
//!
//! Enable with `--features aws`.
//!
//! ## Usage
//!
//! ```toml
//! [store]
//! backend = "aws"
//! region = "us-east-1"
//! profile = "deploy"
//! ```
//!
//! Region and profile come from the config object; anything left unset falls
//! back to the SDK's default provider chain.

use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::types::Tag;
use aws_sdk_secretsmanager::Client;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use super::SecretStore;
use crate::core::domain::{NewSecret, SecretRecord, SecretValue};
use crate::core::types::{SecretId, Tags, VersionId};
use crate::error::{Result, StoreError};

/// Secrets Manager accepts recovery windows between these bounds, or a
/// forced delete without recovery.
const MIN_RECOVERY_DAYS: u32 = 7;
const MAX_RECOVERY_DAYS: u32 = 30;

/// AWS connection settings taken from the `[store]` section.
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

/// Secret store backed by AWS Secrets Manager.
pub struct AwsSecretsManager {
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl AwsSecretsManager {
    /// Build a client from explicit settings.
    pub fn connect(settings: &AwsSettings) -> Result<Self> {
        // The SDK is async; this backend blocks on a private runtime
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Backend(format!("failed to create runtime: {}", e)))?;

        let client = runtime.block_on(async {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = &settings.region {
                loader = loader.region(Region::new(region.clone()));
            }
            if let Some(profile) = &settings.profile {
                loader = loader.profile_name(profile);
            }
            if let Some(endpoint) = &settings.endpoint_url {
                loader = loader.endpoint_url(endpoint);
            }
            Client::new(&loader.load().await)
        });

        debug!(region = ?settings.region, profile = ?settings.profile, "connected to Secrets Manager");
        Ok(Self { client, runtime })
    }
}

fn to_aws_tags(tags: &Tags) -> Vec<Tag> {
    tags.iter()
        .map(|(k, v)| Tag::builder().key(k).value(v).build())
        .collect()
}

/// Keys present on the secret that the desired tag set no longer carries.
fn removed_keys(current: &Tags, desired: &Tags) -> Vec<String> {
    current
        .keys()
        .filter(|k| !desired.contains_key(*k))
        .cloned()
        .collect()
}

fn to_chrono(dt: &aws_sdk_secretsmanager::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn backend_err(action: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("{} failed: {}", action, e))
}

impl AwsSecretsManager {
    async fn describe_async(&self, name: &str) -> Result<Option<SecretRecord>> {
        let out = match self.client.describe_secret().secret_id(name).send().await {
            Ok(out) => out,
            Err(e) => {
                let service = e.into_service_error();
                if service.is_resource_not_found_exception() {
                    return Ok(None);
                }
                return Err(backend_err("DescribeSecret", service).into());
            }
        };

        let tags = out
            .tags()
            .iter()
            .filter_map(|t| Some((t.key()?.to_string(), t.value().unwrap_or("").to_string())))
            .collect();

        // The version carrying the AWSCURRENT staging label
        let current_version = out.version_ids_to_stages().and_then(|stages| {
            stages
                .iter()
                .find(|(_, labels)| labels.iter().any(|l| l == "AWSCURRENT"))
                .map(|(id, _)| id.clone())
        });

        let deleted_at = out.deleted_date().and_then(to_chrono);
        // Secrets Manager does not report the purge date; assume the widest window
        let purge_at = deleted_at.map(|at| at + Duration::days(i64::from(MAX_RECOVERY_DAYS)));

        Ok(Some(SecretRecord {
            id: out.arn().unwrap_or(name).to_string(),
            name: out.name().unwrap_or(name).to_string(),
            description: out.description().unwrap_or("").to_string(),
            tags,
            current_version,
            deleted_at,
            purge_at,
        }))
    }

    async fn create_async(&self, secret: &NewSecret) -> Result<SecretId> {
        let out = self
            .client
            .create_secret()
            .name(&secret.name)
            .description(&secret.description)
            .set_tags(Some(to_aws_tags(&secret.tags)))
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_resource_exists_exception() {
                    StoreError::AlreadyExists(secret.name.clone())
                } else {
                    backend_err("CreateSecret", service)
                }
            })?;

        let arn = out
            .arn()
            .ok_or_else(|| backend_err("CreateSecret", "no ARN returned"))?;
        Ok(arn.to_string())
    }

    async fn update_async(&self, id: &str, description: &str, tags: &Tags) -> Result<()> {
        self.client
            .update_secret()
            .secret_id(id)
            .description(description)
            .send()
            .await
            .map_err(|e| backend_err("UpdateSecret", e.into_service_error()))?;

        // TagResource only adds or overwrites
        let current = self
            .describe_async(id)
            .await?
            .map(|record| record.tags)
            .unwrap_or_default();
        let removed = removed_keys(&current, tags);
        if !removed.is_empty() {
            debug!(id = %id, removed = removed.len(), "removing stale tags");
            self.client
                .untag_resource()
                .secret_id(id)
                .set_tag_keys(Some(removed))
                .send()
                .await
                .map_err(|e| backend_err("UntagResource", e.into_service_error()))?;
        }

        self.client
            .tag_resource()
            .secret_id(id)
            .set_tags(Some(to_aws_tags(tags)))
            .send()
            .await
            .map_err(|e| backend_err("TagResource", e.into_service_error()))?;

        Ok(())
    }

    async fn put_value_async(&self, id: &str, value: &SecretValue) -> Result<VersionId> {
        let out = self
            .client
            .put_secret_value()
            .secret_id(id)
            .secret_string(value.expose())
            .send()
            .await
            .map_err(|e| backend_err("PutSecretValue", e.into_service_error()))?;

        let version = out
            .version_id()
            .ok_or_else(|| backend_err("PutSecretValue", "no version id returned"))?;
        Ok(version.to_string())
    }

    async fn current_value_async(&self, id: &str) -> Result<Option<(VersionId, SecretValue)>> {
        let out = match self.client.get_secret_value().secret_id(id).send().await {
            Ok(out) => out,
            Err(e) => {
                let service = e.into_service_error();
                if service.is_resource_not_found_exception() {
                    return Ok(None);
                }
                return Err(backend_err("GetSecretValue", service).into());
            }
        };

        match (out.version_id(), out.secret_string()) {
            (Some(version), Some(value)) => Ok(Some((version.to_string(), SecretValue::new(value)))),
            _ => Ok(None),
        }
    }

    async fn delete_async(&self, id: &str, recovery_window_days: u32) -> Result<()> {
        let request = self.client.delete_secret().secret_id(id);
        let request = match recovery_window_days {
            0 => request.force_delete_without_recovery(true),
            days if (MIN_RECOVERY_DAYS..=MAX_RECOVERY_DAYS).contains(&days) => {
                request.recovery_window_in_days(i64::from(days))
            }
            days => {
                return Err(StoreError::Backend(format!(
                    "recovery window of {} days is outside {}..={} (or 0)",
                    days, MIN_RECOVERY_DAYS, MAX_RECOVERY_DAYS
                ))
                .into())
            }
        };

        request
            .send()
            .await
            .map_err(|e| backend_err("DeleteSecret", e.into_service_error()))?;
        Ok(())
    }
}

impl SecretStore for AwsSecretsManager {
    fn name(&self) -> &'static str {
        "aws"
    }

    fn describe(&self, name: &str) -> Result<Option<SecretRecord>> {
        trace!(name = %name, "DescribeSecret");
        self.runtime.block_on(self.describe_async(name))
    }

    fn create_secret(&self, secret: &NewSecret) -> Result<SecretId> {
        trace!(name = %secret.name, "CreateSecret");
        self.runtime.block_on(self.create_async(secret))
    }

    fn update_secret(&self, id: &str, description: &str, tags: &Tags) -> Result<()> {
        trace!(id = %id, tags = tags.len(), "UpdateSecret");
        self.runtime.block_on(self.update_async(id, description, tags))
    }

    fn put_secret_value(&self, id: &str, value: &SecretValue) -> Result<VersionId> {
        trace!(id = %id, value_len = value.len(), "PutSecretValue");
        self.runtime.block_on(self.put_value_async(id, value))
    }

    fn current_value(&self, id: &str) -> Result<Option<(VersionId, SecretValue)>> {
        trace!(id = %id, "GetSecretValue");
        self.runtime.block_on(self.current_value_async(id))
    }

    fn delete_secret(&self, id: &str, recovery_window_days: u32) -> Result<()> {
        trace!(id = %id, recovery_window_days, "DeleteSecret");
        self.runtime.block_on(self.delete_async(id, recovery_window_days))
    }
}
