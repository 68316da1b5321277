//! Action-specific reconciliation rules.
//!
//! Reconciliation is a pure function of the parsed payload and the
//! authoritative operation record. The payload is only a claim about the
//! record; the record decides.
//!
//! Rules:
//!
//! - `ChangeQuantity`: the operation must still be pending
//!   (`NotStarted`/`InProgress`) and the payload quantity must exactly equal
//!   the marketplace's authoritative quantity.
//! - Every other action, known or unknown, is rejected until an explicit
//!   rule exists for it. There is no accept-by-default path.

use super::action::SubscriptionAction;
use super::decision::{Decision, RejectReason};
use super::operation::OperationRecord;
use super::payload::NotificationPayload;

/// Decide whether a notification is consistent with the marketplace's own
/// record of the operation.
pub fn reconcile(payload: &NotificationPayload, record: &OperationRecord) -> Decision {
    match payload.action() {
        SubscriptionAction::ChangeQuantity => reconcile_change_quantity(payload, record),

        // Known actions without a validation rule yet. Each one needs an
        // explicit arm here before it can be accepted.
        action @ (SubscriptionAction::ChangePlan
        | SubscriptionAction::Unsubscribed
        | SubscriptionAction::Suspend
        | SubscriptionAction::Reinstate
        | SubscriptionAction::Renew) => {
            tracing::info!(action = %action, "No validation rule for action, rejecting");
            Decision::Rejected(RejectReason::UnrecognizedAction(action.as_str().to_string()))
        }

        SubscriptionAction::Unknown(other) => {
            tracing::warn!(action = %other, "Unknown action in payload, rejecting");
            Decision::Rejected(RejectReason::UnrecognizedAction(other))
        }
    }
}

fn reconcile_change_quantity(
    payload: &NotificationPayload,
    record: &OperationRecord,
) -> Decision {
    if !record.status.is_pending() {
        tracing::info!(
            status = %record.status,
            operation_id = %payload.id,
            "Operation already finalized, rejecting stale notification"
        );
        return Decision::Rejected(RejectReason::OperationNotPending(record.status));
    }

    let claimed = match payload.quantity {
        Some(q) => q,
        None => return Decision::Rejected(RejectReason::MissingQuantity),
    };

    // The operations API is authoritative; a record without a quantity
    // cannot corroborate the payload, so the notification is rejected.
    let authoritative = match record.quantity {
        Some(q) => q,
        None => {
            tracing::warn!(
                operation_id = %payload.id,
                "Marketplace record has no quantity for a ChangeQuantity operation"
            );
            return Decision::Rejected(RejectReason::QuantityMismatch {
                payload: claimed,
                marketplace: 0,
            });
        }
    };

    if claimed != authoritative {
        tracing::info!(
            payload_quantity = claimed,
            marketplace_quantity = authoritative,
            operation_id = %payload.id,
            "Quantity in payload disagrees with marketplace record"
        );
        return Decision::Rejected(RejectReason::QuantityMismatch {
            payload: claimed,
            marketplace: authoritative,
        });
    }

    tracing::info!(
        operation_id = %payload.id,
        subscription_id = %payload.subscription_id,
        quantity = claimed,
        "Payload check against marketplace record passed"
    );
    Decision::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::OperationStatus;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn payload(action: &str, quantity: Option<u64>) -> NotificationPayload {
        NotificationPayload {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            action: action.to_string(),
            quantity,
            plan_id: None,
            time_stamp: None,
        }
    }

    fn record(status: OperationStatus, quantity: Option<u64>) -> OperationRecord {
        OperationRecord { status, quantity }
    }

    // ══════════════════════════════════════════════════════════════
    // ChangeQuantity Rules
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn accepts_matching_quantity_while_in_progress() {
        let decision = reconcile(
            &payload("ChangeQuantity", Some(5)),
            &record(OperationStatus::InProgress, Some(5)),
        );
        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn accepts_matching_quantity_while_not_started() {
        let decision = reconcile(
            &payload("ChangeQuantity", Some(12)),
            &record(OperationStatus::NotStarted, Some(12)),
        );
        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn rejects_quantity_mismatch() {
        let decision = reconcile(
            &payload("ChangeQuantity", Some(5)),
            &record(OperationStatus::InProgress, Some(7)),
        );
        assert_eq!(
            decision,
            Decision::Rejected(RejectReason::QuantityMismatch {
                payload: 5,
                marketplace: 7,
            })
        );
    }

    #[test]
    fn rejects_terminal_statuses_even_with_matching_quantity() {
        for status in [
            OperationStatus::Succeeded,
            OperationStatus::Failed,
            OperationStatus::Conflict,
        ] {
            let decision = reconcile(
                &payload("ChangeQuantity", Some(5)),
                &record(status, Some(5)),
            );
            assert_eq!(
                decision,
                Decision::Rejected(RejectReason::OperationNotPending(status)),
                "status {status} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_change_quantity_without_quantity() {
        let decision = reconcile(
            &payload("ChangeQuantity", None),
            &record(OperationStatus::InProgress, Some(5)),
        );
        assert_eq!(decision, Decision::Rejected(RejectReason::MissingQuantity));
    }

    #[test]
    fn rejects_when_record_lacks_quantity() {
        let decision = reconcile(
            &payload("ChangeQuantity", Some(5)),
            &record(OperationStatus::InProgress, None),
        );
        assert!(matches!(
            decision,
            Decision::Rejected(RejectReason::QuantityMismatch { .. })
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Default-Reject for Other Actions
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn rejects_actions_without_rules() {
        for action in ["ChangePlan", "Unsubscribed", "Suspend", "Reinstate", "Renew"] {
            let decision = reconcile(
                &payload(action, None),
                &record(OperationStatus::InProgress, None),
            );
            assert_eq!(
                decision,
                Decision::Rejected(RejectReason::UnrecognizedAction(action.to_string())),
                "action {action} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_unknown_action_even_with_pending_status() {
        let decision = reconcile(
            &payload("Transfer", Some(5)),
            &record(OperationStatus::NotStarted, Some(5)),
        );
        assert_eq!(
            decision,
            Decision::Rejected(RejectReason::UnrecognizedAction("Transfer".to_string()))
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Properties
    // ══════════════════════════════════════════════════════════════

    fn any_status() -> impl Strategy<Value = OperationStatus> {
        prop_oneof![
            Just(OperationStatus::NotStarted),
            Just(OperationStatus::InProgress),
            Just(OperationStatus::Failed),
            Just(OperationStatus::Succeeded),
            Just(OperationStatus::Conflict),
        ]
    }

    proptest! {
        /// A ChangeQuantity notification is accepted exactly when the
        /// operation is pending and the quantities agree.
        #[test]
        fn change_quantity_accepted_iff_pending_and_equal(
            claimed in 0u64..10_000,
            authoritative in 0u64..10_000,
            status in any_status(),
        ) {
            let decision = reconcile(
                &payload("ChangeQuantity", Some(claimed)),
                &record(status, Some(authoritative)),
            );
            let should_accept = status.is_pending() && claimed == authoritative;
            prop_assert_eq!(decision.is_accepted(), should_accept);
        }

        /// Terminal operations never yield acceptance, whatever the payload.
        #[test]
        fn terminal_status_never_accepts(
            claimed in proptest::option::of(0u64..10_000),
            authoritative in proptest::option::of(0u64..10_000),
        ) {
            for status in [
                OperationStatus::Failed,
                OperationStatus::Succeeded,
                OperationStatus::Conflict,
            ] {
                let decision = reconcile(
                    &payload("ChangeQuantity", claimed),
                    &record(status, authoritative),
                );
                prop_assert!(!decision.is_accepted());
            }
        }
    }
}
