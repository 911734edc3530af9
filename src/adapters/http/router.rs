//! Top-level router for the tracker API.

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::accounts::{account_routes, health, metrics, AccountAppState};

/// Builds the full API: `/accounts/...`, `/metrics` and `/health`.
pub fn app_router(state: AccountAppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/accounts", account_routes())
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
