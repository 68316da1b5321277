//! Reconciliation decision for a webhook notification.
//!
//! Every request ends in exactly one decision, produced once and never
//! persisted. Rejections carry a reason that maps to the externally visible
//! status code: authentication failures are Forbidden, everything else is
//! Conflict (fail-closed).

use http::StatusCode;
use thiserror::Error;

use super::operation::OperationStatus;

/// Why a notification was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Bearer credential missing, malformed, unverifiable, or claims did
    /// not match the configured caller identity.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request body could not be parsed into a well-formed notification.
    #[error("Malformed payload: {0}")]
    PayloadMalformed(String),

    /// The operations API could not be reached or answered with an error.
    #[error("Operation status unavailable: {0}")]
    OracleUnavailable(String),

    /// The referenced operation is already finalized; the notification is
    /// stale or replayed.
    #[error("Operation is not pending (status: {0})")]
    OperationNotPending(OperationStatus),

    /// Payload quantity disagrees with the marketplace's authoritative value.
    #[error("Quantity mismatch: payload {payload}, marketplace {marketplace}")]
    QuantityMismatch { payload: u64, marketplace: u64 },

    /// A quantity-change notification arrived without a quantity.
    #[error("Quantity missing from ChangeQuantity payload")]
    MissingQuantity,

    /// No validation rule exists for this action yet; default is reject.
    #[error("No validation rule for action: {0}")]
    UnrecognizedAction(String),
}

impl RejectReason {
    /// HTTP status the marketplace caller sees for this rejection.
    ///
    /// Authentication failures are the only Forbidden outcome; every other
    /// rejection is Conflict so the marketplace will not finalize the
    /// operation.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RejectReason::AuthenticationFailed(_) => StatusCode::FORBIDDEN,
            RejectReason::PayloadMalformed(_)
            | RejectReason::OracleUnavailable(_)
            | RejectReason::OperationNotPending(_)
            | RejectReason::QuantityMismatch { .. }
            | RejectReason::MissingQuantity
            | RejectReason::UnrecognizedAction(_) => StatusCode::CONFLICT,
        }
    }

    /// Stable machine-readable reason code for the response body and logs.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            RejectReason::PayloadMalformed(_) => "PAYLOAD_MALFORMED",
            RejectReason::OracleUnavailable(_) => "OPERATION_STATUS_UNAVAILABLE",
            RejectReason::OperationNotPending(_) => "OPERATION_NOT_PENDING",
            RejectReason::QuantityMismatch { .. } => "QUANTITY_MISMATCH",
            RejectReason::MissingQuantity => "QUANTITY_MISSING",
            RejectReason::UnrecognizedAction(_) => "UNRECOGNIZED_ACTION",
        }
    }
}

/// Outcome of the verification pipeline for one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The notification is plausible and well-formed; the marketplace may
    /// commit the change.
    Accepted,
    /// The notification was rejected; the reason determines the response.
    Rejected(RejectReason),
}

impl Decision {
    /// True if the notification was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }
}
