//! Webhook authentication configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Webhook authentication configuration.
///
/// These values describe the identity the marketplace platform presents when
/// calling the webhook. Incoming bearer tokens must carry exactly this
/// application id (`aud`) and tenant id (`tid`); the expected issuer is
/// derived from the tenant id.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Expected application (client) id in the token `aud` claim
    pub application_id: String,

    /// Expected directory (tenant) id in the token `tid` claim
    pub tenant_id: String,

    /// JWKS cache TTL in seconds
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    /// Get JWKS cache TTL as Duration
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.application_id.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__APPLICATION_ID"));
        }
        if self.tenant_id.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__TENANT_ID"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            tenant_id: String::new(),
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}
