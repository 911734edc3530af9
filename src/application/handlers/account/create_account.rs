//! CreateAccountHandler - Command handler for creating accounts.

use std::sync::Arc;

use crate::domain::account::{Account, NewAccount};
use crate::domain::foundation::DomainError;
use crate::ports::AccountStore;

/// Command to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub name: String,
    pub is_active: bool,
}

/// Handler for creating accounts.
pub struct CreateAccountHandler {
    store: Arc<dyn AccountStore>,
}

impl CreateAccountHandler {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: CreateAccountCommand) -> Result<Account, DomainError> {
        let new_account = NewAccount::new(cmd.name, cmd.is_active)?;
        let account = self.store.create(new_account).await?;

        tracing::info!(account_id = %account.id, is_active = account.is_active, "Account created");
        Ok(account)
    }
}
