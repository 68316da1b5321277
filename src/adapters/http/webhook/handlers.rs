//! HTTP handlers for the marketplace webhook endpoint.
//!
//! The handler connects the Axum route to the application-layer
//! notification handler and maps the resulting decision onto the wire
//! contract: Accepted -> 200 with no body, authentication failure -> 403,
//! every other rejection -> 409, each with a minimal reason-code body.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::application::handlers::webhook::{
    HandleNotificationCommand, HandleNotificationHandler,
};
use crate::domain::notification::{ClaimPolicy, Decision};
use crate::ports::{OperationOracle, TokenValidator};

use super::dto::ErrorResponse;

/// Shared application state containing all webhook dependencies.
///
/// This struct is cloned per request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub token_validator: Arc<dyn TokenValidator>,
    pub oracle: Arc<dyn OperationOracle>,
    pub claim_policy: ClaimPolicy,
}

impl WebhookAppState {
    /// Create the notification handler on demand from the shared state.
    pub fn notification_handler(&self) -> HandleNotificationHandler {
        HandleNotificationHandler::new(
            self.token_validator.clone(),
            self.oracle.clone(),
            self.claim_policy.clone(),
        )
    }
}

/// POST /api/webhooks/marketplace - Gate a marketplace lifecycle notification
pub async fn handle_marketplace_notification(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleNotificationCommand {
        authorization,
        payload: body.to_vec(),
    };

    match state.notification_handler().handle(cmd).await {
        Decision::Accepted => {
            tracing::info!("Notification accepted");
            StatusCode::OK.into_response()
        }
        Decision::Rejected(reason) => {
            tracing::info!(code = reason.code(), reason = %reason, "Notification rejected");
            let body = ErrorResponse::new(reason.code(), reason.to_string());
            (reason.status_code(), Json(body)).into_response()
        }
    }
}
