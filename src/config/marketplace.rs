//! Marketplace API configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Marketplace API configuration.
///
/// Credentials for the service principal used to query the SaaS Fulfillment
/// operations API, plus endpoint overrides for testing. The client secret is
/// wrapped in [`SecretString`] so it is redacted from `Debug` output and
/// never logged.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Directory (tenant) id of the service principal
    pub tenant_id: String,

    /// Client id of the service principal
    pub client_id: String,

    /// Client secret of the service principal
    pub client_secret: SecretString,

    /// Base URL of the marketplace SaaS Fulfillment API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the token authority
    #[serde(default = "default_authority_base_url")]
    pub authority_base_url: String,

    /// Timeout for operation-status requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl MarketplaceConfig {
    /// Get the operation-status request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate marketplace configuration
    ///
    /// In production, both endpoint URLs must use HTTPS. In development they
    /// may point at plain-HTTP stand-ins.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.tenant_id.is_empty() {
            return Err(ValidationError::MissingRequired("MARKETPLACE__TENANT_ID"));
        }
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("MARKETPLACE__CLIENT_ID"));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "MARKETPLACE__CLIENT_SECRET",
            ));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 60 {
            return Err(ValidationError::InvalidOracleTimeout);
        }

        if *environment == Environment::Production {
            if !self.api_base_url.starts_with("https://") {
                return Err(ValidationError::ApiBaseMustBeHttps);
            }
            if !self.authority_base_url.starts_with("https://") {
                return Err(ValidationError::AuthorityMustBeHttps);
            }
        }

        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://marketplaceapi.microsoft.com".to_string()
}

fn default_authority_base_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MarketplaceConfig {
        MarketplaceConfig {
            tenant_id: "22222222-2222-2222-2222-222222222222".to_string(),
            client_id: "33333333-3333-3333-3333-333333333333".to_string(),
            client_secret: SecretString::new("s3cret".to_string()),
            api_base_url: default_api_base_url(),
            authority_base_url: default_authority_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = test_config();
        assert_eq!(config.api_base_url, "https://marketplaceapi.microsoft.com");
        assert_eq!(
            config.authority_base_url,
            "https://login.microsoftonline.com"
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(test_config().validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_validation_missing_secret() {
        let config = MarketplaceConfig {
            client_secret: SecretString::new(String::new()),
            ..test_config()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_rejects_excessive_timeout() {
        let config = MarketplaceConfig {
            request_timeout_secs: 120,
            ..test_config()
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidOracleTimeout)
        ));
    }

    #[test]
    fn test_validation_production_requires_https() {
        let config = MarketplaceConfig {
            api_base_url: "http://localhost:9090".to_string(),
            ..test_config()
        };
        // Allowed in development
        assert!(config.validate(&Environment::Development).is_ok());
        // Rejected in production
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::ApiBaseMustBeHttps)
        ));
    }

    #[test]
    fn test_secret_redacted_in_debug_output() {
        let config = test_config();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
    }
}
