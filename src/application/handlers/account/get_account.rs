//! GetAccountHandler - Query handler for retrieving an account.

use std::sync::Arc;

use crate::domain::account::Account;
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::AccountStore;

/// Query to get an account by ID.
#[derive(Debug, Clone, Copy)]
pub struct GetAccountQuery {
    pub account_id: AccountId,
}

/// Handler for retrieving accounts.
pub struct GetAccountHandler {
    store: Arc<dyn AccountStore>,
}

impl GetAccountHandler {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetAccountQuery) -> Result<Account, DomainError> {
        self.store.get(query.account_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", query.account_id),
            )
        })
    }
}
