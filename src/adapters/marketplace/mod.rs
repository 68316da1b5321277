//! Marketplace API adapters.
//!
//! Implementation of the `OperationOracle` port against the SaaS
//! Fulfillment operations API.

mod client;

pub use client::{MarketplaceApiConfig, MarketplaceClient};
