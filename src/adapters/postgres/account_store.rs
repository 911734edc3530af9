//! PostgreSQL implementation of AccountStore.
//!
//! Accounts live in a single `account` table:
//!
//! ```sql
//! CREATE TABLE account (
//!     id        SERIAL       PRIMARY KEY,
//!     name      VARCHAR(255) NOT NULL,
//!     is_active BOOLEAN      NOT NULL DEFAULT TRUE
//! );
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::account::{Account, NewAccount};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode};
use crate::ports::AccountStore;

/// PostgreSQL implementation of AccountStore.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a new PostgresAccountStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `account` table if missing and seed it on first creation.
    ///
    /// Seeded accounts get generated names and are active. Returns the
    /// number of accounts inserted (zero when the table already existed).
    pub async fn ensure_schema(&self, seed_accounts: u32) -> Result<u64, DomainError> {
        let seed_count = seed_count(seed_accounts)?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = 'account')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("check account table", e))?;

        if exists {
            return Ok(0);
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS account (
                id        SERIAL       PRIMARY KEY,
                name      VARCHAR(255) NOT NULL,
                is_active BOOLEAN      NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("create account table", e))?;

        let seeded = sqlx::query(
            "INSERT INTO account (name) SELECT md5(random()::text) FROM generate_series(1, $1)",
        )
        .bind(seed_count)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("seed accounts", e))?
        .rows_affected();

        tracing::info!(seeded, "Created account table");
        Ok(seeded)
    }
}

/// `generate_series` takes an `INTEGER` bound.
fn seed_count(seed_accounts: u32) -> Result<i32, DomainError> {
    i32::try_from(seed_accounts).map_err(|_| {
        DomainError::validation(
            "seed_accounts",
            format!("seed count {} exceeds {}", seed_accounts, i32::MAX),
        )
    })
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn is_active(&self, id: AccountId) -> Result<bool, DomainError> {
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM account WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("check account status", e))?;

        active.ok_or_else(|| {
            DomainError::new(ErrorCode::AccountNotFound, format!("Account not found: {}", id))
        })
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query("SELECT id, name, is_active FROM account WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch account", e))?;

        row.map(row_to_account).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<Account, DomainError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO account (name, is_active) VALUES ($1, $2) RETURNING id",
        )
        .bind(account.name())
        .bind(account.is_active())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("insert account", e))?;

        Ok(account.into_account(AccountId::new(id)?))
    }

    async fn deactivate(&self, id: AccountId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE account SET is_active = FALSE WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deactivate account", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", id),
            ));
        }

        Ok(())
    }
}

fn row_to_account(row: sqlx::postgres::PgRow) -> Result<Account, DomainError> {
    let id: i32 = row.try_get("id").map_err(|e| db_error("read account id", e))?;
    Ok(Account {
        id: AccountId::new(id)?,
        name: row.try_get("name").map_err(|e| db_error("read account name", e))?,
        is_active: row
            .try_get("is_active")
            .map_err(|e| db_error("read account status", e))?,
    })
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", action, e),
    )
}
