//! Secret types.
//!
//! `SecretValue` is the carrier for the generated payload. Its `Debug`,
//! `Display` and `Serialize` output is always `<sensitive>`; the only way to
//! read the payload is [`SecretValue::expose`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::core::types::{SecretId, SecretName, Tags, VersionId};

/// Placeholder printed wherever a secret payload would otherwise appear.
pub const REDACTED: &str = "<sensitive>";

/// A secret payload, zeroed on drop and redacted in every formatter.
#[derive(Clone)]
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    /// Wrap a payload.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Read the raw payload.
    ///
    /// Call this only at the handoff to a store or to the explicit reveal
    /// output; never pass the result to a logging macro.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for SecretValue {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SecretValue {}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// Parameters for creating a secret container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSecret {
    pub name: SecretName,
    pub description: String,
    pub tags: Tags,
    pub recovery_window_days: u32,
}

/// Store-side view of a secret container, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: SecretId,
    pub name: SecretName,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Tags,
    /// Version currently marked current, if any value was ever stored.
    #[serde(default)]
    pub current_version: Option<VersionId>,
    /// When deletion was requested. Set only while inside a recovery window.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the store will purge the secret for good.
    #[serde(default)]
    pub purge_at: Option<DateTime<Utc>>,
}

impl SecretRecord {
    /// Whether the secret is inside its recovery window.
    pub fn is_pending_deletion(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// What provisioning did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Secret container and first version were created.
    Created,
    /// Generation inputs were unchanged; the current version was kept.
    Unchanged,
    /// Generation inputs changed; a new version was attached.
    Rotated,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Unchanged => "unchanged",
            Outcome::Rotated => "rotated",
        };
        f.write_str(s)
    }
}

/// Result of provisioning: the secret's coordinates plus its sensitive value.
#[derive(Debug, Clone, Serialize)]
pub struct SecretHandle {
    pub name: SecretName,
    pub id: SecretId,
    pub version_id: VersionId,
    pub outcome: Outcome,
    pub value: SecretValue,
}

impl fmt::Display for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version_id)
    }
}
