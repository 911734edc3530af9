//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresAccountStore` - account records and schema bootstrap

mod account_store;

pub use account_store::PostgresAccountStore;
