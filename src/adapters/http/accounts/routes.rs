//! HTTP routes for account and event endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    create_account, deactivate_account, get_account, publish_event, AccountAppState,
};

/// Routes mounted under `/accounts`.
pub fn account_routes() -> Router<AccountAppState> {
    Router::new()
        .route("/", post(create_account))
        .route("/:id", get(get_account))
        .route("/:id/deactivate", post(deactivate_account))
        .route("/:id/events", put(publish_event))
}
