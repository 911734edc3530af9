//! Storage adapters for non-relational backends.
//!
//! - `InMemoryAccountStore` - accounts in memory, for tests and local runs

mod in_memory_account_store;

pub use in_memory_account_store::InMemoryAccountStore;
