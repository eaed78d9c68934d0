// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use civic_config::CivicConfig;
use civic_core::{ChatBackend, CivicError, StorageAdapter};
use civic_normalize::MessageNormalizer;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::auth::{AuthConfig, auth_middleware};
use crate::dashboard;
use crate::handlers;
use crate::rate_limit::SessionRateLimiter;

/// Upper bound on requests processed at once.
const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Loaded configuration (texts, widget content, limits).
    pub config: Arc<CivicConfig>,
    /// Where chat turns are sent.
    pub backend: Arc<dyn ChatBackend>,
    /// Conversation persistence.
    pub storage: Arc<dyn StorageAdapter>,
    /// Maps backend replies onto messages.
    pub normalizer: MessageNormalizer,
    /// Per-session request budget for the chat endpoint.
    pub rate_limiter: Arc<SessionRateLimiter>,
    /// Admin API authentication.
    pub auth: AuthConfig,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        config: Arc<CivicConfig>,
        backend: Arc<dyn ChatBackend>,
        storage: Arc<dyn StorageAdapter>,
    ) -> Self {
        let normalizer = MessageNormalizer::new(config.errors.network_error.clone());
        let rate_limiter = Arc::new(SessionRateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ));
        let auth = AuthConfig {
            bearer_token: config.gateway.admin_token.clone(),
        };
        Self {
            config,
            backend,
            storage,
            normalizer,
            rate_limiter,
            auth,
            start_time: Instant::now(),
        }
    }
}

/// Gateway bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builds the full router.
///
/// Public routes serve the chat widget; `/admin/*` routes require the
/// bearer token.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/widget", get(handlers::get_widget))
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/feedback", post(handlers::post_feedback))
        .route(
            "/api/conversations/{id}/messages",
            get(handlers::get_conversation_messages),
        )
        .route(
            "/api/conversations/{id}/complete",
            post(handlers::post_complete_conversation),
        )
        .route("/api/annotate", post(handlers::post_annotate))
        .route(
            "/api/users/{user_id}/conversations",
            get(dashboard::get_user_conversations),
        )
        .route("/api/users/{user_id}/stats", get(dashboard::get_user_stats))
        .route("/api/users/{user_id}/dashboard", get(dashboard::get_dashboard))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/stats", get(admin::get_stats))
        .route("/admin/conversations", get(admin::list_conversations))
        .route("/admin/conversations/{id}", get(admin::get_conversation))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds the gateway listener.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, CivicError> {
    let addr = config.addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| CivicError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serves on an already-bound listener until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), CivicError> {
    let limiter = state.rate_limiter.clone();
    let app = build_router(state);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway server listening on {addr}");
    }

    // Idle rate-limit entries are swept once a minute.
    let sweeper_cancel = cancel.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            tokio::select! {
                _ = interval.tick() => limiter.cleanup(),
                _ = sweeper_cancel.cancelled() => break,
            }
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| CivicError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

/// Binds and serves until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), CivicError> {
    let listener = bind(config).await?;
    serve(listener, state, cancel).await
}
