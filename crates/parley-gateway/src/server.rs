// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use parley_agent::AskEngine;
use parley_core::ParleyError;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;
use crate::webhook::WebhookNotifier;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The ask pipeline (also carries the database handle).
    pub engine: Arc<AskEngine>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Optional event webhook.
    pub webhook: Option<WebhookNotifier>,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors GatewayConfig from parley-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - `GET  /health` (unauthenticated)
/// - `GET  /conversations`
/// - `POST /conversations`
/// - `GET  /conversations/{id}/messages`
/// - `DELETE /conversations/{id}`
/// - `POST /ask`
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated public routes (health for probes).
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    // Routes behind (optional) bearer auth.
    let api_routes = Router::new()
        .route("/conversations", get(handlers::get_conversations))
        .route("/conversations", post(handlers::post_conversations))
        .route(
            "/conversations/{id}/messages",
            get(handlers::get_conversation_messages),
        )
        .route("/conversations/{id}", delete(handlers::delete_conversation))
        .route("/ask", post(handlers::post_ask))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until the task is cancelled.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ParleyError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ParleyError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ParleyError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
