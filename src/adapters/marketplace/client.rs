//! Marketplace SaaS Fulfillment API client.
//!
//! Implements the `OperationOracle` port against the marketplace operations
//! endpoint. Each lookup acquires a client-credentials token for the
//! configured service principal and then fetches the operation status
//! record keyed by `(subscriptionId, operationId)`.
//!
//! # Security
//!
//! - The client secret is held in `secrecy::SecretString` and only exposed
//!   in the token request form body
//! - All requests carry a bounded timeout; expiry maps to
//!   `OracleError::Timeout` so the caller rejects fail-closed

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::MarketplaceConfig;
use crate::domain::notification::OperationRecord;
use crate::ports::{OperationOracle, OracleError};

/// API version pinned by the SaaS Fulfillment operations contract.
const API_VERSION: &str = "2018-08-31";

/// Resource scope of the SaaS Fulfillment API for client-credentials tokens.
const FULFILLMENT_SCOPE: &str = "20e940b3-4c77-4b0b-9a53-9e16a1b010a7/.default";

/// Marketplace API client configuration.
#[derive(Clone)]
pub struct MarketplaceApiConfig {
    /// Directory (tenant) id of the service principal.
    tenant_id: String,

    /// Client id of the service principal.
    client_id: String,

    /// Client secret of the service principal.
    client_secret: SecretString,

    /// Base URL for the fulfillment API.
    api_base_url: String,

    /// Base URL for the token authority.
    authority_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl MarketplaceApiConfig {
    /// Create a new configuration with required credentials.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            api_base_url: "https://marketplaceapi.microsoft.com".to_string(),
            authority_base_url: "https://login.microsoftonline.com".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set a custom authority base URL (for testing).
    pub fn with_authority_base_url(mut self, url: impl Into<String>) -> Self {
        self.authority_base_url = url.into();
        self
    }

    /// Set a custom request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Token endpoint for the service principal's tenant.
    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_base_url.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Operation-status endpoint for one operation.
    fn operation_url(&self, subscription_id: Uuid, operation_id: Uuid) -> String {
        format!(
            "{}/api/saas/subscriptions/{}/operations/{}?api-version={}",
            self.api_base_url.trim_end_matches('/'),
            subscription_id,
            operation_id,
            API_VERSION
        )
    }
}

impl From<&MarketplaceConfig> for MarketplaceApiConfig {
    fn from(config: &MarketplaceConfig) -> Self {
        Self {
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            api_base_url: config.api_base_url.clone(),
            authority_base_url: config.authority_base_url.clone(),
            request_timeout: config.request_timeout(),
        }
    }
}

impl std::fmt::Debug for MarketplaceApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceApiConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

/// Token response from the authority.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Marketplace operations API client.
///
/// Implements `OperationOracle` over the SaaS Fulfillment API.
pub struct MarketplaceClient {
    config: MarketplaceApiConfig,
    http_client: reqwest::Client,
}

impl MarketplaceClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MarketplaceApiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Acquire a bearer token for the fulfillment API via the
    /// client-credentials grant.
    async fn acquire_token(&self) -> Result<String, OracleError> {
        let response = self
            .http_client
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("scope", FULFILLMENT_SCOPE),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            tracing::error!(%status, "Authority rejected service principal credentials");
            return Err(OracleError::CredentialsRejected);
        }
        if !status.is_success() {
            tracing::error!(%status, "Token request failed");
            return Err(OracleError::Unreachable(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            OracleError::InvalidResponse(format!("token response did not parse: {}", e))
        })?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl OperationOracle for MarketplaceClient {
    async fn get_operation(
        &self,
        subscription_id: Uuid,
        operation_id: Uuid,
    ) -> Result<OperationRecord, OracleError> {
        let access_token = self.acquire_token().await?;

        let url = self.config.operation_url(subscription_id, operation_id);
        tracing::debug!(%subscription_id, %operation_id, "Querying operation status");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        match status {
            reqwest::StatusCode::OK => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                tracing::error!(%status, "Fulfillment API rejected credentials");
                return Err(OracleError::CredentialsRejected);
            }
            reqwest::StatusCode::NOT_FOUND => {
                tracing::warn!(%subscription_id, %operation_id, "Operation not found");
                return Err(OracleError::NotFound);
            }
            other => {
                tracing::error!(status = %other, "Unexpected fulfillment API status");
                return Err(OracleError::Unreachable(format!(
                    "operations endpoint returned {}",
                    other
                )));
            }
        }

        let record: OperationRecord = response.json().await.map_err(|e| {
            OracleError::InvalidResponse(format!("operation record did not parse: {}", e))
        })?;

        tracing::debug!(
            %operation_id,
            status = %record.status,
            "Operation status retrieved"
        );

        Ok(record)
    }
}

fn map_transport_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Unreachable(e.to_string())
    }
}
