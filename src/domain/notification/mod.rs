//! Notification domain: the two-stage webhook verification core.
//!
//! Types and rules for authenticating marketplace webhook calls and
//! reconciling their payloads against the authoritative operations API.
//! Everything here is pure and per-request; nothing is shared between
//! requests.

mod action;
mod claims;
mod decision;
mod operation;
mod payload;
mod reconciler;

pub use action::SubscriptionAction;
pub use claims::{ClaimMismatch, ClaimPolicy, MarketplaceClaims};
pub use decision::{Decision, RejectReason};
pub use operation::{OperationRecord, OperationStatus};
pub use payload::NotificationPayload;
pub use reconciler::reconcile;
