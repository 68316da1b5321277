//! Axum router configuration for the webhook endpoint.
//!
//! Webhook routes carry no session authentication: the caller is
//! authenticated per request via its bearer token claims inside the
//! handler, never at the transport layer.

use axum::{routing::post, Router};

use super::handlers::{handle_marketplace_notification, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /marketplace` - Gate a marketplace lifecycle notification
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/marketplace", post(handle_marketplace_notification))
}

/// Create the complete webhook module router, mounted at `/api/webhooks`.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use marketplace_gate::adapters::http::webhook::{webhook_router, WebhookAppState};
///
/// let app_state = WebhookAppState { /* ... */ };
/// let app: Router = webhook_router().with_state(app_state);
/// ```
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new().nest("/api/webhooks", webhook_routes())
}
