//! Operation oracle port for the marketplace operations API.
//!
//! The oracle is the authoritative, read-only source for the status of a
//! pending subscription operation. The gate performs exactly one oracle
//! query per request and treats every failure as grounds for rejection
//! (fail-closed); retry semantics belong to the marketplace caller.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::notification::OperationRecord;

/// Errors from querying the operations API.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// Network-level failure reaching the API.
    #[error("Marketplace API unreachable: {0}")]
    Unreachable(String),

    /// The request exceeded the configured timeout.
    #[error("Marketplace API request timed out")]
    Timeout,

    /// The API rejected the service credentials.
    #[error("Marketplace credentials rejected")]
    CredentialsRejected,

    /// No operation exists for the given subscription/operation pair.
    #[error("Operation not found")]
    NotFound,

    /// The API answered with a body the gate could not interpret.
    #[error("Unexpected marketplace response: {0}")]
    InvalidResponse(String),
}

/// Read-only access to the authoritative status of marketplace operations.
///
/// # Contract
///
/// Implementations must:
/// - Query live state only; no caching across requests
/// - Apply a bounded timeout and surface expiry as `OracleError::Timeout`
/// - Never fabricate a record on error
#[async_trait]
pub trait OperationOracle: Send + Sync {
    /// Fetch the current status record for an operation.
    async fn get_operation(
        &self,
        subscription_id: Uuid,
        operation_id: Uuid,
    ) -> Result<OperationRecord, OracleError>;
}
