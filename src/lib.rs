//! Marketplace Gate - Webhook verification gateway
//!
//! This crate gates Azure Marketplace SaaS subscription lifecycle webhooks
//! behind a two-stage verification pipeline: bearer-token authentication
//! followed by reconciliation against the marketplace operations API.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
