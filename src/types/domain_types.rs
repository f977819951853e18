// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use crate::constants::API_KEY_ENV_VAR;
use std::fmt;

/// Integration token (`secret_...` or `ntn_...`).
///
/// OAuth access tokens have no fixed prefix and are not accepted here; send
/// them through a caller-built client with `HttpTransport::with_client`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    /// Reads the key from `NOTION_API_KEY`, `None` when the variable is unset.
    pub fn from_env() -> Option<Result<Self, ValidationError>> {
        std::env::var(API_KEY_ENV_VAR).ok().map(Self::new)
    }

    /// Get the API key as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create an API key without validation (only for testing)
    #[cfg(test)]
    pub fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact API key in display
        let visible = self.0.char_indices().nth(10).map_or(self.0.len(), |(i, _)| i);
        write!(f, "{}...", &self.0[..visible])
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_keys() {
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new("token_abcdefghijklmnopqrstuvwxyz").is_err());
        assert!(ApiKey::new("secret_short").is_err());
        assert!(ApiKey::new("secret_abcdefghijklmnopqrstuvwxyz").is_ok());
        assert!(ApiKey::new("ntn_abcdefghijklmnopqrstuvwxyz").is_ok());
    }

    #[test]
    fn display_and_debug_redact_the_secret() {
        let key = ApiKey::new_unchecked("secret_abcdefghijklmnopqrstuvwxyz");
        assert_eq!(key.to_string(), "secret_abc...");
        assert!(!format!("{:?}", key).contains("xyz"));
    }
}
