//! Input validation for ferry operations.
//!
//! Everything here runs before the first store call or filesystem change.

use std::collections::HashSet;

use crate::core::constants::{
    MAX_DESCRIPTION_LEN, MAX_LENGTH, MAX_NAME_LEN, MAX_TAG_KEY_LEN, MAX_TAG_VALUE_LEN,
    RESERVED_TAG_PREFIX,
};
use crate::core::types::Tags;
use crate::error::{Result, ValidationError};

/// Validate a secret name.
///
/// Names must be 1 to 512 characters of ASCII letters, digits, and `/_+=.@-`.
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: format!("longer than {} characters", MAX_NAME_LEN),
        }
        .into());
    }

    for (i, ch) in name.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && !"/_+=.@-".contains(ch) {
            return Err(ValidationError::InvalidName {
                name: name.to_string(),
                reason: format!(
                    "invalid character '{}' at position {}. Only letters, digits, and /_+=.@- are allowed",
                    ch.escape_default(),
                    i + 1
                ),
            }
            .into());
        }
    }

    Ok(())
}

/// Validate a secret description.
pub fn validate_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong(len).into());
    }
    Ok(())
}

/// Validate caller-supplied tags.
///
/// Keys under the `ferry:` prefix are reserved for values ferry manages.
pub fn validate_tags(tags: &Tags) -> Result<()> {
    for (key, value) in tags {
        let reason = if key.is_empty() {
            Some("key cannot be empty".to_string())
        } else if key.chars().count() > MAX_TAG_KEY_LEN {
            Some(format!("key is longer than {} characters", MAX_TAG_KEY_LEN))
        } else if value.chars().count() > MAX_TAG_VALUE_LEN {
            Some(format!("value is longer than {} characters", MAX_TAG_VALUE_LEN))
        } else if key.starts_with(RESERVED_TAG_PREFIX) {
            Some(format!("the '{}' prefix is reserved", RESERVED_TAG_PREFIX))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(ValidationError::InvalidTag {
                key: key.clone(),
                reason,
            }
            .into());
        }
    }

    Ok(())
}

/// Validate a generated token length.
pub fn validate_length(length: usize) -> Result<()> {
    if length == 0 {
        return Err(ValidationError::InvalidLength {
            length,
            reason: "must be positive".to_string(),
        }
        .into());
    }
    if length > MAX_LENGTH {
        return Err(ValidationError::InvalidLength {
            length,
            reason: format!("must be at most {}", MAX_LENGTH),
        }
        .into());
    }
    Ok(())
}

/// Validate the set of special characters allowed in a token.
///
/// Each character must be printable ASCII punctuation and appear once.
pub fn validate_special(special: &str) -> Result<()> {
    let mut seen = HashSet::new();

    for ch in special.chars() {
        if !ch.is_ascii_punctuation() {
            return Err(ValidationError::InvalidSpecial {
                ch,
                reason: "only printable ASCII punctuation is allowed".to_string(),
            }
            .into());
        }
        if !seen.insert(ch) {
            return Err(ValidationError::InvalidSpecial {
                ch,
                reason: "listed more than once".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("api-token").is_ok());
        assert!(validate_name("prod/ingestion/api_token").is_ok());
        assert!(validate_name("a+b=c.d@e").is_ok());
        assert!(validate_name("A").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("api token").is_err());
        assert!(validate_name("api#token").is_err());
        assert!(validate_name("tökén").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_description_limit() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"d".repeat(MAX_DESCRIPTION_LEN)).is_ok());
        assert!(validate_description(&"d".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    #[test]
    fn test_tags() {
        let mut tags = Tags::new();
        tags.insert("env".to_string(), "prod".to_string());
        tags.insert("team".to_string(), String::new());
        assert!(validate_tags(&tags).is_ok());

        let mut reserved = Tags::new();
        reserved.insert("ferry:generation".to_string(), "x".to_string());
        assert!(validate_tags(&reserved).is_err());

        let mut empty_key = Tags::new();
        empty_key.insert(String::new(), "x".to_string());
        assert!(validate_tags(&empty_key).is_err());
    }

    #[test]
    fn test_lengths() {
        assert!(validate_length(0).is_err());
        assert!(validate_length(1).is_ok());
        assert!(validate_length(MAX_LENGTH).is_ok());
        assert!(validate_length(MAX_LENGTH + 1).is_err());
    }

    #[test]
    fn test_special() {
        assert!(validate_special("").is_ok());
        assert!(validate_special("!@#$%").is_ok());
        assert!(validate_special("!!").is_err());
        assert!(validate_special("a").is_err());
        assert!(validate_special(" ").is_err());
        assert!(validate_special("é").is_err());
    }
}
