//! Domain types.

mod artifact;
mod generation;
mod secret;
mod target;

pub use artifact::ArtifactHandle;
pub use generation::GenerationSpec;
pub use secret::{NewSecret, Outcome, SecretHandle, SecretRecord, SecretValue, REDACTED};
pub use target::Target;
