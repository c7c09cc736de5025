//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

/// A secret's stable name in the store (e.g., `prod/ingestion/api-token`).
pub type SecretName = String;

/// Store-assigned secret identifier (an ARN for AWS, a UUID for local stores).
pub type SecretId = String;

/// Store-assigned identifier of one immutable secret version.
pub type VersionId = String;

/// Secret tags. Keys are unique and ordered for stable output.
pub type Tags = BTreeMap<String, String>;
