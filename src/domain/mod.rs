//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `notification` - Webhook payload, claims policy, and reconciliation rules

pub mod notification;
