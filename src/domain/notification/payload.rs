//! Marketplace webhook notification payload.
//!
//! The payload is attacker-controlled input: parsing is strict (missing or
//! ill-typed required fields are errors, identifiers must be well-formed
//! UUIDs) and nothing in it is trusted until corroborated against the
//! operations API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::SubscriptionAction;
use super::decision::RejectReason;

/// Notification body posted by the marketplace when a subscription
/// operation is pending.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    /// Operation identifier.
    pub id: Uuid,

    /// Subscription the operation belongs to.
    pub subscription_id: Uuid,

    /// Lifecycle action, as sent on the wire.
    pub action: String,

    /// Requested seat quantity. Only meaningful for `ChangeQuantity`.
    #[serde(default)]
    pub quantity: Option<u64>,

    /// Plan identifier, present on plan-related notifications.
    #[serde(default)]
    pub plan_id: Option<String>,

    /// When the marketplace emitted the notification.
    #[serde(default)]
    pub time_stamp: Option<DateTime<Utc>>,
}

impl NotificationPayload {
    /// Strict-parse a raw request body into a payload.
    ///
    /// # Errors
    ///
    /// Returns `RejectReason::PayloadMalformed` when the body is not valid
    /// JSON, required fields are absent, or identifiers are not UUIDs.
    pub fn parse(body: &[u8]) -> Result<Self, RejectReason> {
        serde_json::from_slice(body).map_err(|e| RejectReason::PayloadMalformed(e.to_string()))
    }

    /// The lifecycle action as a closed enum.
    pub fn action(&self) -> SubscriptionAction {
        SubscriptionAction::from_wire(&self.action)
    }
}
