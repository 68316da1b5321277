//! Webhook HTTP surface.

mod dto;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use handlers::{handle_marketplace_notification, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
