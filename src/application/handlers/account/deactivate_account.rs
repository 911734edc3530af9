//! DeactivateAccountHandler - Command handler for deactivating accounts.
//!
//! A deactivated account stays in the store but the publish gateway
//! refuses events for it.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError};
use crate::ports::AccountStore;

/// Command to deactivate an account.
#[derive(Debug, Clone, Copy)]
pub struct DeactivateAccountCommand {
    pub account_id: AccountId,
}

/// Handler for deactivating accounts.
pub struct DeactivateAccountHandler {
    store: Arc<dyn AccountStore>,
}

impl DeactivateAccountHandler {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: DeactivateAccountCommand) -> Result<(), DomainError> {
        self.store.deactivate(cmd.account_id).await?;
        tracing::info!(account_id = %cmd.account_id, "Account deactivated");
        Ok(())
    }
}
