//! In-Memory Account Store Adapter
//!
//! Stores accounts in memory. Useful for testing and development.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, NewAccount};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::AccountStore;

/// In-memory storage for accounts
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<BTreeMap<AccountId, Account>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryAccountStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `accounts`
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let map = accounts.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: Arc::new(RwLock::new(map)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every operation fail with a database error (useful for tests)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get the number of stored accounts
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated store failure",
            ));
        }
        Ok(())
    }
}

fn not_found(id: AccountId) -> DomainError {
    DomainError::new(ErrorCode::AccountNotFound, format!("Account not found: {}", id))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn is_active(&self, id: AccountId) -> Result<bool, DomainError> {
        self.check_available()?;
        self.accounts
            .read()
            .await
            .get(&id)
            .map(|a| a.is_active)
            .ok_or_else(|| not_found(id))
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        self.check_available()?;
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, DomainError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        let next = accounts
            .keys()
            .next_back()
            .map(|id| id.as_i32() + 1)
            .unwrap_or(1);
        let id = AccountId::new(next)?;
        let account = account.into_account(id);
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn deactivate(&self, id: AccountId) -> Result<(), DomainError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or_else(|| not_found(id))?;
        account.is_active = false;
        Ok(())
    }
}
