//! Data transfer objects for the account endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::account::Account;

/// Body of `POST /accounts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Query string of `PUT /accounts/:id/events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishEventQuery {
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.as_i32(),
            name: account.name,
            is_active: account.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub events_per_second: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::with_code("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_code("CONFLICT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AccountId;
    use serde_json::json;

    #[test]
    fn create_request_defaults_to_active() {
        let req: CreateAccountRequest = serde_json::from_value(json!({"name": "acme"})).unwrap();
        assert!(req.is_active);

        let req: CreateAccountRequest =
            serde_json::from_value(json!({"name": "acme", "is_active": false})).unwrap();
        assert!(!req.is_active);
    }

    #[test]
    fn account_response_flattens_id() {
        let response: AccountResponse = Account {
            id: AccountId::new(8).unwrap(),
            name: "eight".to_string(),
            is_active: true,
        }
        .into();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"id": 8, "name": "eight", "is_active": true})
        );
    }

    #[test]
    fn error_response_omits_empty_details() {
        let value = serde_json::to_value(ErrorResponse::conflict("inactive")).unwrap();
        assert_eq!(value, json!({"code": "CONFLICT", "message": "inactive"}));
    }

    #[test]
    fn error_response_not_found_names_resource() {
        let error = ErrorResponse::not_found("Account", "42");
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.message, "Account not found: 42");
    }
}
