//! Token validator port for bearer credential verification.
//!
//! Defines the contract for verifying the inbound bearer token and
//! extracting its identity claims. The production implementation verifies
//! the token signature and expiry against the issuer's published keys;
//! exact-match comparison of the extracted claims against the configured
//! caller identity happens afterwards in the domain layer (`ClaimPolicy`).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::MarketplaceClaims;

/// Errors from bearer token verification.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token could not be decoded or its signature did not verify.
    #[error("Token is invalid")]
    InvalidToken,

    /// Token signature verified but the token has expired.
    #[error("Token has expired")]
    TokenExpired,

    /// Required identity claims are absent from the token.
    #[error("Token is missing required claims")]
    MissingClaims,

    /// The signing-key discovery endpoint could not be reached.
    #[error("Key discovery unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Verifies bearer tokens and extracts marketplace identity claims.
///
/// # Contract
///
/// Implementations must:
/// - Verify the cryptographic signature against the issuer's key set
/// - Verify the token has not expired
/// - Return the `aud`, `tid` and `iss` claims on success
/// - Never panic on malformed input; every failure is an `AuthError`
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a raw bearer token and extract its claims.
    async fn validate(&self, token: &str) -> Result<MarketplaceClaims, AuthError>;
}
