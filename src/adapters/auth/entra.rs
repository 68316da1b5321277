//! Entra ID adapter for marketplace bearer token validation.
//!
//! This adapter implements the `TokenValidator` port against the Microsoft
//! identity platform. It validates tokens by:
//!
//! 1. Fetching the tenant's JWKS from the discovery endpoint
//! 2. Verifying the token signature against the published keys
//! 3. Verifying expiry and the issuer/audience claims
//! 4. Mapping claims to the domain `MarketplaceClaims` type
//!
//! # Security
//!
//! The original marketplace webhook samples read token claims without
//! verifying the signature. This adapter closes that gap: a token whose
//! signature does not verify against the tenant's published keys never
//! reaches claim comparison. The extracted claims are still exact-match
//! checked a second time by `ClaimPolicy` in the domain layer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, TokenData, Validation,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::notification::MarketplaceClaims;
use crate::ports::{AuthError, TokenValidator};

/// Configuration for the Entra ID token validator.
#[derive(Debug, Clone)]
pub struct EntraConfig {
    /// Directory (tenant) id used for key discovery and issuer validation.
    pub tenant_id: String,

    /// Expected audience claim in tokens.
    pub audience: String,

    /// Base URL of the authority (overridable for tests).
    pub authority_base_url: String,

    /// Optional: How long to cache the JWKS before refetching.
    /// Defaults to 1 hour if not specified.
    pub jwks_cache_duration: Option<Duration>,
}

impl EntraConfig {
    /// Create a new configuration with required fields.
    pub fn new(tenant_id: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            audience: audience.into(),
            authority_base_url: "https://login.microsoftonline.com".to_string(),
            jwks_cache_duration: None,
        }
    }

    /// Set a custom authority base URL (for testing).
    pub fn with_authority_base_url(mut self, url: impl Into<String>) -> Self {
        self.authority_base_url = url.into();
        self
    }

    /// Set custom JWKS cache duration.
    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.jwks_cache_duration = Some(duration);
        self
    }

    /// Get the JWKS discovery URL for this tenant.
    fn jwks_url(&self) -> String {
        format!(
            "{}/{}/discovery/v2.0/keys",
            self.authority_base_url.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Get the issuer URL tokens from this tenant carry.
    fn issuer(&self) -> String {
        format!(
            "{}/{}/v2.0",
            self.authority_base_url.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// JWT claims structure for marketplace tokens.
#[derive(Debug, Deserialize)]
struct EntraTokenClaims {
    /// Audience - array or single string
    #[serde(default)]
    aud: Audience,

    /// Directory (tenant) id
    tid: String,

    /// Issuer URL
    iss: String,

    /// Expiry timestamp (Unix epoch seconds)
    #[allow(dead_code)]
    exp: i64,
}

/// Audience can be a single string or array of strings in JWTs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// The entry matching `expected` when present, otherwise the first entry.
    fn matching_or_first(&self, expected: &str) -> Option<&str> {
        match self {
            Audience::None => None,
            Audience::Single(s) => Some(s),
            Audience::Multiple(v) => v
                .iter()
                .find(|s| s.as_str() == expected)
                .or_else(|| v.first())
                .map(String::as_str),
        }
    }
}

/// Cached JWKS with expiry tracking.
struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    cache_duration: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, cache_duration: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            cache_duration,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.cache_duration
    }
}

/// Entra ID token validator.
///
/// Validates marketplace bearer tokens against the tenant's JWKS.
/// This is the production implementation of `TokenValidator`.
pub struct EntraTokenValidator {
    config: EntraConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
}

impl EntraTokenValidator {
    /// Create a new validator.
    ///
    /// This does NOT fetch the JWKS immediately - keys are fetched lazily on
    /// first validation to avoid blocking during startup.
    pub fn new(config: EntraConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
            jwks_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Fetch the JWKS from the discovery endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();

        tracing::debug!("Fetching JWKS from {}", url);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            tracing::error!("Failed to fetch JWKS: {}", e);
            AuthError::ServiceUnavailable(format!("Failed to fetch JWKS: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("JWKS endpoint returned {}", status);
            return Err(AuthError::ServiceUnavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse JWKS: {}", e);
            AuthError::ServiceUnavailable(format!("Failed to parse JWKS: {}", e))
        })?;

        tracing::debug!("Fetched {} keys from JWKS", jwks.keys.len());

        Ok(jwks)
    }

    /// Get the JWKS, using the cache if available and not expired.
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        // Check cache first
        {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        // Cache miss or expired - fetch new JWKS
        let jwks = self.fetch_jwks().await?;

        // Update cache
        {
            let mut cache = self.jwks_cache.write().await;
            let duration = self
                .config
                .jwks_cache_duration
                .unwrap_or(Duration::from_secs(3600));
            *cache = Some(JwksCache::new(jwks.clone(), duration));
        }

        Ok(jwks)
    }

    /// Find the decoding key for a JWT.
    fn find_decoding_key(
        &self,
        header: &jsonwebtoken::Header,
        jwks: &JwkSet,
    ) -> Result<(DecodingKey, Algorithm), AuthError> {
        // Get the key ID from the JWT header
        let kid = header.kid.as_ref().ok_or_else(|| {
            tracing::warn!("JWT missing 'kid' header");
            AuthError::InvalidToken
        })?;

        // Find matching key in JWKS
        let jwk = jwks.find(kid).ok_or_else(|| {
            tracing::warn!("No matching key found for kid: {}", kid);
            AuthError::InvalidToken
        })?;

        // Determine algorithm
        let algorithm = match jwk.common.key_algorithm {
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS256) => Algorithm::RS256,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS512) => Algorithm::RS512,
            Some(other) => {
                tracing::warn!("Unsupported algorithm: {:?}", other);
                return Err(AuthError::InvalidToken);
            }
            // Entra ID signs with RS256 and often omits 'alg' from the JWKS
            None => Algorithm::RS256,
        };

        // Create decoding key
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!("Failed to create decoding key: {}", e);
            AuthError::InvalidToken
        })?;

        Ok((decoding_key, algorithm))
    }

    /// Validate a JWT and extract claims.
    fn validate_token(
        &self,
        token: &str,
        decoding_key: &DecodingKey,
        algorithm: Algorithm,
    ) -> Result<TokenData<EntraTokenClaims>, AuthError> {
        let mut validation = Validation::new(algorithm);

        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        decode::<EntraTokenClaims>(token, decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in token");
                    AuthError::InvalidToken
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Invalid audience in token");
                    AuthError::InvalidToken
                }
                ErrorKind::Json(_) => {
                    tracing::warn!("Token missing required claims");
                    AuthError::MissingClaims
                }
                _ => {
                    tracing::warn!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })
    }
}

#[async_trait]
impl TokenValidator for EntraTokenValidator {
    async fn validate(&self, token: &str) -> Result<MarketplaceClaims, AuthError> {
        // Decode header to get key ID
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Failed to decode JWT header: {}", e);
            AuthError::InvalidToken
        })?;

        // Get JWKS (cached or fresh)
        let jwks = self.get_jwks().await?;

        // Find the matching key
        let (decoding_key, algorithm) = self.find_decoding_key(&header, &jwks)?;

        // Verify signature, expiry, issuer and audience
        let token_data = self.validate_token(token, &decoding_key, algorithm)?;
        let claims = token_data.claims;

        let audience = claims
            .aud
            .matching_or_first(&self.config.audience)
            .ok_or_else(|| {
                tracing::warn!("Token missing audience claim");
                AuthError::MissingClaims
            })?
            .to_string();

        Ok(MarketplaceClaims {
            audience,
            tenant: claims.tid,
            issuer: claims.iss,
        })
    }
}

impl std::fmt::Debug for EntraTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntraTokenValidator")
            .field("tenant_id", &self.config.tenant_id)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}
