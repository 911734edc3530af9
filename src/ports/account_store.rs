//! Account store port.
//!
//! The relational store holding accounts. The publish gateway only asks
//! whether an account is active; the CRUD endpoints use the rest.

use async_trait::async_trait;

use crate::domain::account::{Account, NewAccount};
use crate::domain::foundation::{AccountId, DomainError};

/// Repository port for account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether the account is active.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if no such account exists
    /// - `DatabaseError` on store failure
    async fn is_active(&self, id: AccountId) -> Result<bool, DomainError>;

    /// Find an account by ID. Returns `None` if not found.
    async fn get(&self, id: AccountId) -> Result<Option<Account>, DomainError>;

    /// Create an account; the store assigns the ID.
    async fn create(&self, account: NewAccount) -> Result<Account, DomainError>;

    /// Flag an account as inactive.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if no such account exists
    async fn deactivate(&self, id: AccountId) -> Result<(), DomainError>;
}
