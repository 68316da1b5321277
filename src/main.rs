//! Marketplace webhook gateway entry point.
//!
//! Wires the Entra ID token validator and the fulfillment API client into
//! the webhook router, then serves it with graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketplace_gate::adapters::auth::{EntraConfig, EntraTokenValidator};
use marketplace_gate::adapters::http::webhook::webhook_router;
use marketplace_gate::adapters::http::WebhookAppState;
use marketplace_gate::adapters::marketplace::{MarketplaceApiConfig, MarketplaceClient};
use marketplace_gate::config::AppConfig;
use marketplace_gate::domain::notification::ClaimPolicy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server.log_level);

    tracing::info!(
        environment = ?config.server.environment,
        host = %config.server.host,
        port = config.server.port,
        "starting marketplace webhook gateway"
    );

    let state = build_state(&config);

    let app: Router = webhook_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_state(config: &AppConfig) -> WebhookAppState {
    let entra_config = EntraConfig::new(
        config.auth.tenant_id.clone(),
        config.auth.application_id.clone(),
    )
    .with_cache_duration(config.auth.jwks_cache_ttl());
    let token_validator = Arc::new(EntraTokenValidator::new(entra_config));

    let oracle = Arc::new(MarketplaceClient::new(MarketplaceApiConfig::from(
        &config.marketplace,
    )));

    let claim_policy = ClaimPolicy::new(
        config.auth.application_id.clone(),
        config.auth.tenant_id.clone(),
    );

    WebhookAppState {
        token_validator,
        oracle,
        claim_policy,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
