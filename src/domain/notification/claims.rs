//! Identity claims and the claim acceptance policy.
//!
//! A webhook call is only trusted when the bearer token's audience, tenant
//! and issuer all exactly equal the configured expected values. There is no
//! partial trust: a single mismatch rejects the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim set extracted from a verified marketplace bearer token.
///
/// Constructed fresh per request and discarded after the authentication
/// decision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MarketplaceClaims {
    /// `aud` claim: the application the token was issued for.
    pub audience: String,

    /// `tid` claim: the directory tenant that issued the token.
    pub tenant: String,

    /// `iss` claim: the token-issuing authority URL.
    pub issuer: String,
}

/// A specific claim that failed the exact-match comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimMismatch {
    #[error("audience does not match expected application id")]
    Audience,

    #[error("tenant does not match expected tenant id")]
    Tenant,

    #[error("issuer does not match expected issuer")]
    Issuer,
}

/// Expected identity of the webhook caller.
///
/// The expected issuer is derived from the tenant id using the
/// `login.microsoftonline.com` v2.0 template.
#[derive(Debug, Clone)]
pub struct ClaimPolicy {
    application_id: String,
    tenant_id: String,
}

impl ClaimPolicy {
    /// Create a policy from the configured application and tenant ids.
    pub fn new(application_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Expected application id (`aud`).
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Expected tenant id (`tid`).
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Issuer URL tokens from the expected tenant must carry.
    pub fn expected_issuer(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/v2.0",
            self.tenant_id
        )
    }

    /// Verify a claim set against the policy.
    ///
    /// All three claims must exactly equal the expected values. Each
    /// mismatch is logged with the expected and received values (claims are
    /// not secrets) before rejection.
    pub fn verify(&self, claims: &MarketplaceClaims) -> Result<(), ClaimMismatch> {
        if claims.audience != self.application_id {
            tracing::warn!(
                expected = %self.application_id,
                received = %claims.audience,
                "Application id claim does not match"
            );
            return Err(ClaimMismatch::Audience);
        }

        if claims.tenant != self.tenant_id {
            tracing::warn!(
                expected = %self.tenant_id,
                received = %claims.tenant,
                "Tenant id claim does not match"
            );
            return Err(ClaimMismatch::Tenant);
        }

        let expected_issuer = self.expected_issuer();
        if claims.issuer != expected_issuer {
            tracing::warn!(
                expected = %expected_issuer,
                received = %claims.issuer,
                "Issuer claim does not match"
            );
            return Err(ClaimMismatch::Issuer);
        }

        Ok(())
    }
}
