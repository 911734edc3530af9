//! Event bus adapters.
//!
//! Adapters implement the `EventBus` port for different environments:
//!
//! - `RedisEventBus` - Redis pub/sub, used in production
//! - `InMemoryEventBus` - in-process broadcast, for tests and local runs
//! - `delivery` - the decode-and-forward task both adapters run per subscription

pub mod delivery;
mod in_memory;
mod redis_bus;

pub use delivery::{DeliveryEnd, DeliveryStats};
pub use in_memory::InMemoryEventBus;
pub use redis_bus::{RedisEventBus, DEFAULT_SUBSCRIBER_BUFFER};
