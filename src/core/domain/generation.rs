//! Token generation parameters.

use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::core::constants::{DEFAULT_LENGTH, DEFAULT_SPECIAL};
use crate::core::domain::SecretValue;
use crate::core::validation;
use crate::error::Result;

const FINGERPRINT_VERSION: &str = "ferry-generation-v1";

/// How a token is generated: its length and which special characters may
/// appear alongside `a-z`, `A-Z` and `0-9`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSpec {
    length: usize,
    special: String,
}

impl GenerationSpec {
    pub fn new(length: usize, special: impl Into<String>) -> Self {
        Self {
            length,
            special: special.into(),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn special(&self) -> &str {
        &self.special
    }

    /// Check the length and special alphabet.
    pub fn validate(&self) -> Result<()> {
        validation::validate_length(self.length)?;
        validation::validate_special(&self.special)?;
        Ok(())
    }

    /// Full alphabet in a fixed order: lowercase, uppercase, digits, special.
    pub fn alphabet(&self) -> Vec<char> {
        ('a'..='z')
            .chain('A'..='Z')
            .chain('0'..='9')
            .chain(self.special.chars())
            .collect()
    }

    /// Stable digest of the generation inputs.
    ///
    /// Two specs with the same fingerprint would generate from the same
    /// distribution, so an existing value can be kept.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_VERSION.as_bytes());
        hasher.update([0]);
        hasher.update(self.length.to_string().as_bytes());
        hasher.update([0]);
        hasher.update(self.special.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generate a fresh token from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the length or alphabet is invalid.
    pub fn generate(&self) -> Result<SecretValue> {
        self.validate()?;
        Ok(self.generate_with(&mut OsRng))
    }

    /// Generate a token from the given random source. Assumes a valid spec.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> SecretValue {
        let alphabet = self.alphabet();
        let token: String = (0..self.length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();

        trace!(length = token.len(), "generated token");
        SecretValue::new(token)
    }
}

impl Default for GenerationSpec {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH, DEFAULT_SPECIAL)
    }
}
