//! HandleNotificationHandler - runs the two-stage verification pipeline.
//!
//! Stage one authenticates the caller (bearer token verification plus
//! exact-match claim comparison). Stage two parses the payload, queries the
//! operations API once, and applies the action-specific reconciliation
//! rules. Authentication strictly precedes reconciliation: the oracle is
//! never queried for an unauthenticated request.
//!
//! The handler never returns an error; every failure mode collapses into a
//! `Decision::Rejected` with a reason, so a single request can never take
//! the process down.

use std::sync::Arc;

use crate::domain::notification::{
    reconcile, ClaimPolicy, Decision, NotificationPayload, RejectReason,
};
use crate::ports::{OperationOracle, TokenValidator};

/// Command carrying the raw request material for one notification.
#[derive(Debug, Clone)]
pub struct HandleNotificationCommand {
    /// Raw `Authorization` header value, if present.
    pub authorization: Option<String>,
    /// Raw request body.
    pub payload: Vec<u8>,
}

/// Handler for marketplace webhook notifications.
pub struct HandleNotificationHandler {
    token_validator: Arc<dyn TokenValidator>,
    oracle: Arc<dyn OperationOracle>,
    claim_policy: ClaimPolicy,
}

impl HandleNotificationHandler {
    pub fn new(
        token_validator: Arc<dyn TokenValidator>,
        oracle: Arc<dyn OperationOracle>,
        claim_policy: ClaimPolicy,
    ) -> Self {
        Self {
            token_validator,
            oracle,
            claim_policy,
        }
    }

    /// Run the pipeline and produce a decision.
    pub async fn handle(&self, cmd: HandleNotificationCommand) -> Decision {
        // 1. Extract the bearer credential
        let token = match bearer_token(cmd.authorization.as_deref()) {
            Some(token) => token,
            None => {
                tracing::warn!("Missing or malformed Authorization header");
                return Decision::Rejected(RejectReason::AuthenticationFailed(
                    "missing or malformed Authorization header".to_string(),
                ));
            }
        };

        // 2. Verify signature and expiry, extract claims
        let claims = match self.token_validator.validate(token).await {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "Bearer token verification failed");
                return Decision::Rejected(RejectReason::AuthenticationFailed(e.to_string()));
            }
        };

        tracing::debug!(
            audience = %claims.audience,
            tenant = %claims.tenant,
            issuer = %claims.issuer,
            "Token claims extracted"
        );

        // 3. Exact-match claim comparison against the configured identity
        if let Err(mismatch) = self.claim_policy.verify(&claims) {
            return Decision::Rejected(RejectReason::AuthenticationFailed(mismatch.to_string()));
        }

        // 4. Strict-parse the payload
        let payload = match NotificationPayload::parse(&cmd.payload) {
            Ok(payload) => payload,
            Err(reason) => {
                tracing::warn!(error = %reason, "Notification payload failed to parse");
                return Decision::Rejected(reason);
            }
        };

        tracing::info!(
            action = %payload.action(),
            operation_id = %payload.id,
            subscription_id = %payload.subscription_id,
            "Authenticated notification received"
        );

        // 5. Single live query against the authoritative operations API
        let record = match self
            .oracle
            .get_operation(payload.subscription_id, payload.id)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation_id = %payload.id,
                    "Operation status query failed, rejecting fail-closed"
                );
                return Decision::Rejected(RejectReason::OracleUnavailable(e.to_string()));
            }
        };

        tracing::info!(
            status = %record.status,
            operation_id = %payload.id,
            "Operation status retrieved"
        );

        // 6. Action-specific reconciliation
        reconcile(&payload, &record)
    }
}

/// Extract the token from a `Bearer <token>` authorization header value.
///
/// The scheme comparison is case-insensitive per RFC 7235; an empty token
/// is treated as absent.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use uuid::Uuid;

    use crate::domain::notification::{
        MarketplaceClaims, OperationRecord, OperationStatus,
    };
    use crate::ports::{AuthError, OracleError};

    const APP_ID: &str = "11111111-1111-1111-1111-111111111111";
    const TENANT_ID: &str = "22222222-2222-2222-2222-222222222222";

    // ══════════════════════════════════════════════════════════════
    // Test Doubles
    // ══════════════════════════════════════════════════════════════

    struct StaticValidator {
        result: Result<MarketplaceClaims, AuthError>,
    }

    #[async_trait]
    impl TokenValidator for StaticValidator {
        async fn validate(&self, _token: &str) -> Result<MarketplaceClaims, AuthError> {
            self.result.clone()
        }
    }

    struct CountingOracle {
        result: Result<OperationRecord, OracleError>,
        calls: AtomicUsize,
    }

    impl CountingOracle {
        fn new(result: Result<OperationRecord, OracleError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OperationOracle for CountingOracle {
        async fn get_operation(
            &self,
            _subscription_id: Uuid,
            _operation_id: Uuid,
        ) -> Result<OperationRecord, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn matching_claims() -> MarketplaceClaims {
        MarketplaceClaims {
            audience: APP_ID.to_string(),
            tenant: TENANT_ID.to_string(),
            issuer: format!("https://login.microsoftonline.com/{}/v2.0", TENANT_ID),
        }
    }

    fn policy() -> ClaimPolicy {
        ClaimPolicy::new(APP_ID, TENANT_ID)
    }

    fn change_quantity_body(quantity: u64) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": Uuid::new_v4(),
            "subscriptionId": Uuid::new_v4(),
            "action": "ChangeQuantity",
            "quantity": quantity,
        }))
        .unwrap()
    }

    fn handler(
        validation: Result<MarketplaceClaims, AuthError>,
        oracle: Arc<CountingOracle>,
    ) -> HandleNotificationHandler {
        HandleNotificationHandler::new(
            Arc::new(StaticValidator { result: validation }),
            oracle,
            policy(),
        )
    }

    fn command(authorization: Option<&str>, payload: Vec<u8>) -> HandleNotificationCommand {
        HandleNotificationCommand {
            authorization: authorization.map(str::to_string),
            payload,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Bearer Extraction
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn bearer_token_extracts_credential() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(Some("bearer token")), Some("token"));
        assert_eq!(bearer_token(Some("BEARER token")), Some("token"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(Some("Basic dXNlcjpwYXNz")), None);
    }

    #[test]
    fn bearer_token_rejects_missing_or_empty() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
    }

    // ══════════════════════════════════════════════════════════════
    // Pipeline Ordering
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_header_rejects_without_querying_oracle() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(5),
        }));
        let handler = handler(Ok(matching_claims()), oracle.clone());

        let decision = handler.handle(command(None, change_quantity_body(5))).await;

        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::AuthenticationFailed(_))
        ));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_token_rejects_without_querying_oracle() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(5),
        }));
        let handler = handler(Err(AuthError::InvalidToken), oracle.clone());

        let decision = handler
            .handle(command(Some("Bearer forged"), change_quantity_body(5)))
            .await;

        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::AuthenticationFailed(_))
        ));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn claim_mismatch_rejects_without_querying_oracle() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(5),
        }));
        let wrong_audience = MarketplaceClaims {
            audience: "99999999-9999-9999-9999-999999999999".to_string(),
            ..matching_claims()
        };
        let handler = handler(Ok(wrong_audience), oracle.clone());

        let decision = handler
            .handle(command(Some("Bearer token"), change_quantity_body(5)))
            .await;

        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::AuthenticationFailed(_))
        ));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_payload_rejects_without_querying_oracle() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(5),
        }));
        let handler = handler(Ok(matching_claims()), oracle.clone());

        let decision = handler
            .handle(command(Some("Bearer token"), b"not json".to_vec()))
            .await;

        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::PayloadMalformed(_))
        ));
        assert_eq!(oracle.call_count(), 0);
    }

    // ══════════════════════════════════════════════════════════════
    // Reconciliation Outcomes
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn accepts_consistent_change_quantity() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(5),
        }));
        let handler = handler(Ok(matching_claims()), oracle.clone());

        let decision = handler
            .handle(command(Some("Bearer token"), change_quantity_body(5)))
            .await;

        assert_eq!(decision, Decision::Accepted);
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn rejects_quantity_mismatch() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(7),
        }));
        let handler = handler(Ok(matching_claims()), oracle);

        let decision = handler
            .handle(command(Some("Bearer token"), change_quantity_body(5)))
            .await;

        assert_eq!(
            decision,
            Decision::Rejected(RejectReason::QuantityMismatch {
                payload: 5,
                marketplace: 7,
            })
        );
    }

    #[tokio::test]
    async fn rejects_terminal_operation() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::Succeeded,
            quantity: Some(5),
        }));
        let handler = handler(Ok(matching_claims()), oracle);

        let decision = handler
            .handle(command(Some("Bearer token"), change_quantity_body(5)))
            .await;

        assert_eq!(
            decision,
            Decision::Rejected(RejectReason::OperationNotPending(
                OperationStatus::Succeeded
            ))
        );
    }

    #[tokio::test]
    async fn oracle_failure_rejects_fail_closed() {
        let oracle = CountingOracle::new(Err(OracleError::Timeout));
        let handler = handler(Ok(matching_claims()), oracle);

        let decision = handler
            .handle(command(Some("Bearer token"), change_quantity_body(5)))
            .await;

        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::OracleUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn expired_token_is_authentication_failure() {
        let oracle = CountingOracle::new(Ok(OperationRecord {
            status: OperationStatus::InProgress,
            quantity: Some(5),
        }));
        let handler = handler(Err(AuthError::TokenExpired), oracle.clone());

        let decision = handler
            .handle(command(Some("Bearer stale"), change_quantity_body(5)))
            .await;

        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::AuthenticationFailed(_))
        ));
        assert_eq!(oracle.call_count(), 0);
    }
}
