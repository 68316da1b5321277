//! Marketplace subscription lifecycle actions.
//!
//! The webhook payload names the pending change with an `action` string.
//! The set of actions is closed: every variant the gate is willing to accept
//! needs an explicit reconciliation rule, and anything off the list is
//! captured as `Unknown` and rejected downstream.

/// Lifecycle action reported by a marketplace notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAction {
    /// Customer changed the number of purchased seats.
    ChangeQuantity,
    /// Customer switched to a different plan.
    ChangePlan,
    /// Customer cancelled the subscription.
    Unsubscribed,
    /// Marketplace suspended the subscription (e.g. payment failure).
    Suspend,
    /// Previously suspended subscription was reinstated.
    Reinstate,
    /// Subscription term was renewed.
    Renew,
    /// Action string not in the known vocabulary.
    Unknown(String),
}

impl SubscriptionAction {
    /// Parse an action from its wire representation.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "ChangeQuantity" => Self::ChangeQuantity,
            "ChangePlan" => Self::ChangePlan,
            "Unsubscribed" => Self::Unsubscribed,
            "Suspend" => Self::Suspend,
            "Reinstate" => Self::Reinstate,
            "Renew" => Self::Renew,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Wire representation of the action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ChangeQuantity => "ChangeQuantity",
            Self::ChangePlan => "ChangePlan",
            Self::Unsubscribed => "Unsubscribed",
            Self::Suspend => "Suspend",
            Self::Reinstate => "Reinstate",
            Self::Renew => "Renew",
            Self::Unknown(other) => other,
        }
    }
}

impl std::fmt::Display for SubscriptionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
