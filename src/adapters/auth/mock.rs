//! Mock token validator for testing.
//!
//! Implements the `TokenValidator` port without needing a live identity
//! provider: tokens are looked up in an in-memory map of token string to
//! claim set.
//!
//! # Example
//!
//! ```ignore
//! use marketplace_gate::adapters::auth::MockTokenValidator;
//! use marketplace_gate::domain::notification::MarketplaceClaims;
//!
//! let validator = MockTokenValidator::new().with_claims("valid-token", MarketplaceClaims {
//!     audience: "app-id".to_string(),
//!     tenant: "tenant-id".to_string(),
//!     issuer: "https://login.microsoftonline.com/tenant-id/v2.0".to_string(),
//! });
//!
//! let claims = validator.validate("valid-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::notification::MarketplaceClaims;
use crate::ports::{AuthError, TokenValidator};

/// Mock token validator for testing.
///
/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockTokenValidator {
    /// Map of valid tokens to their claim sets
    tokens: RwLock<HashMap<String, MarketplaceClaims>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a claim set.
    pub fn with_claims(self, token: impl Into<String>, claims: MarketplaceClaims) -> Self {
        self.tokens.write().unwrap().insert(token.into(), claims);
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, claims: MarketplaceClaims) {
        self.tokens.write().unwrap().insert(token.into(), claims);
    }
}

#[async_trait]
impl TokenValidator for MockTokenValidator {
    async fn validate(&self, token: &str) -> Result<MarketplaceClaims, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
