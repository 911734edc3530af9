//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Event bus implementations (Redis, in-memory)
//! - `postgres` - PostgreSQL account store
//! - `storage` - In-memory account store
//! - `metrics` - Throughput meter
//! - `http` - REST API

pub mod events;
pub mod http;
pub mod metrics;
pub mod postgres;
pub mod storage;

pub use events::{InMemoryEventBus, RedisEventBus};
pub use metrics::SlidingWindowCounter;
pub use postgres::PostgresAccountStore;
pub use storage::InMemoryAccountStore;
