//! HTTP handlers for account and event endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::{
    CreateAccountCommand, CreateAccountHandler, DeactivateAccountCommand,
    DeactivateAccountHandler, GetAccountHandler, GetAccountQuery, PublishError,
    PublishEventCommand, PublishEventHandler,
};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::{AccountStore, EventBus, ThroughputMeter};

use super::dto::{
    AccountResponse, CreateAccountRequest, ErrorResponse, MetricsResponse, PublishEventQuery,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AccountAppState {
    create_handler: Arc<CreateAccountHandler>,
    get_handler: Arc<GetAccountHandler>,
    deactivate_handler: Arc<DeactivateAccountHandler>,
    publish_handler: Arc<PublishEventHandler>,
    meter: Arc<dyn ThroughputMeter>,
}

impl AccountAppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        bus: Arc<dyn EventBus>,
        meter: Arc<dyn ThroughputMeter>,
        origin_tag: Option<String>,
    ) -> Self {
        let mut publish = PublishEventHandler::new(store.clone(), bus, meter.clone());
        if let Some(tag) = origin_tag {
            publish = publish.with_origin_tag(tag);
        }

        Self {
            create_handler: Arc::new(CreateAccountHandler::new(store.clone())),
            get_handler: Arc::new(GetAccountHandler::new(store.clone())),
            deactivate_handler: Arc::new(DeactivateAccountHandler::new(store)),
            publish_handler: Arc::new(publish),
            meter,
        }
    }

    /// Wait for publishes dispatched by earlier requests. Call after the
    /// server stops accepting requests.
    pub async fn drain_publishes(&self, timeout: Duration) -> bool {
        self.publish_handler.drain(timeout).await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /accounts - Create an account
pub async fn create_account(
    State(state): State<AccountAppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Response {
    let cmd = CreateAccountCommand {
        name: req.name,
        is_active: req.is_active,
    };

    match state.create_handler.handle(cmd).await {
        Ok(account) => {
            let location = format!("/accounts/{}", account.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(AccountResponse::from(account)),
            )
                .into_response()
        }
        Err(e) => handle_domain_error(e),
    }
}

/// GET /accounts/:id - Get an account
pub async fn get_account(
    State(state): State<AccountAppState>,
    Path(account_id): Path<String>,
) -> Response {
    let account_id = match parse_account_id(&account_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.get_handler.handle(GetAccountQuery { account_id }).await {
        Ok(account) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// POST /accounts/:id/deactivate - Stop accepting events for an account
pub async fn deactivate_account(
    State(state): State<AccountAppState>,
    Path(account_id): Path<String>,
) -> Response {
    let account_id = match parse_account_id(&account_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .deactivate_handler
        .handle(DeactivateAccountCommand { account_id })
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// PUT /accounts/:id/events?data=... - Publish an event for an account
///
/// Answers 202 as soon as the publish is dispatched.
pub async fn publish_event(
    State(state): State<AccountAppState>,
    Path(account_id): Path<String>,
    Query(query): Query<PublishEventQuery>,
) -> Response {
    let cmd = PublishEventCommand {
        account_id,
        data: query.data,
    };

    match state.publish_handler.handle(cmd).await {
        Ok(_dispatch) => StatusCode::ACCEPTED.into_response(),
        Err(e) => handle_publish_error(e),
    }
}

/// GET /metrics - Confirmed publishes over the last second
pub async fn metrics(State(state): State<AccountAppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        events_per_second: state.meter.current(),
    })
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_account_id(raw: &str) -> Result<AccountId, Response> {
    raw.parse::<AccountId>().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!("Invalid account ID: {}", e))),
        )
            .into_response()
    })
}

fn handle_publish_error(error: PublishError) -> Response {
    match error {
        PublishError::InvalidIdentifier(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!("Invalid account ID: {}", e))),
        )
            .into_response(),
        PublishError::MissingPayload => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Query parameter 'data' is required")),
        )
            .into_response(),
        PublishError::AccountInactive(id) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(format!("Account {} is not active", id))),
        )
            .into_response(),
        PublishError::LookupFailed(e) => handle_domain_error(e),
    }
}

fn handle_domain_error(error: DomainError) -> Response {
    let status = match error.code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::AccountNotFound => StatusCode::NOT_FOUND,
        ErrorCode::DatabaseError | ErrorCode::InternalError => {
            tracing::error!(error = %error, "Account store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = match error.code {
        ErrorCode::ValidationFailed => ErrorResponse::bad_request(error.message),
        ErrorCode::AccountNotFound => ErrorResponse {
            code: "NOT_FOUND".to_string(),
            message: error.message,
            details: None,
        },
        _ => ErrorResponse::internal("Account store unavailable"),
    };

    let body = if error.details.is_empty() || status.is_server_error() {
        body
    } else {
        body.with_details(serde_json::json!(error.details))
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn inactive_account_maps_to_409() {
        let response = handle_publish_error(PublishError::AccountInactive(AccountId::new(3).unwrap()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_identifier_and_missing_payload_map_to_400() {
        let invalid = PublishError::InvalidIdentifier(ValidationError::empty_field("account_id"));
        assert_eq!(handle_publish_error(invalid).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            handle_publish_error(PublishError::MissingPayload).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn lookup_failure_maps_by_cause() {
        let missing = DomainError::new(ErrorCode::AccountNotFound, "Account not found: 9");
        assert_eq!(
            handle_publish_error(PublishError::LookupFailed(missing)).status(),
            StatusCode::NOT_FOUND
        );

        let down = DomainError::new(ErrorCode::DatabaseError, "pool timed out");
        assert_eq!(
            handle_publish_error(PublishError::LookupFailed(down)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_error_maps_to_400() {
        let error = DomainError::validation("name", "name is required");
        assert_eq!(handle_domain_error(error).status(), StatusCode::BAD_REQUEST);
    }
}
