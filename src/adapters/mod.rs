//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Token validation against Microsoft Entra ID
//! - `marketplace` - Marketplace fulfillment API client
//! - `http` - Inbound webhook endpoint

pub mod auth;
pub mod http;
pub mod marketplace;
