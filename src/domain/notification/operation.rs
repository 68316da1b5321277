//! Operation status snapshot from the marketplace operations API.
//!
//! The operations API is the single source of truth for a pending change.
//! The gate only reads the current snapshot; the marketplace owns all state
//! transitions (`NotStarted -> InProgress -> {Succeeded | Failed | Conflict}`).

use serde::{Deserialize, Serialize};

/// Status of a marketplace operation as reported by the operations API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum OperationStatus {
    /// Operation registered but not yet picked up.
    NotStarted,
    /// Operation currently being applied.
    InProgress,
    /// Operation finished unsuccessfully.
    Failed,
    /// Operation finished successfully.
    Succeeded,
    /// Operation ended in a conflicting state.
    Conflict,
}

impl OperationStatus {
    /// True while the operation has not reached a terminal state.
    ///
    /// Only pending operations may still be gated; a notification referencing
    /// a terminal operation is stale or replayed.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::NotStarted | Self::InProgress)
    }

    /// True once the operation has been finalized by the marketplace.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Failed => "Failed",
            Self::Succeeded => "Succeeded",
            Self::Conflict => "Conflict",
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative record for one operation, keyed by
/// `(subscriptionId, operationId)` on the operations API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Current status of the operation.
    pub status: OperationStatus,

    /// Authoritative seat quantity for quantity-change operations.
    #[serde(default)]
    pub quantity: Option<u64>,
}
