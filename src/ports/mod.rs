//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `EventBus` - publish/subscribe over the message broker
//! - `AccountStore` - relational account records
//! - `ThroughputMeter` - rolling publish rate

mod account_store;
mod event_bus;
mod throughput_meter;

pub use account_store::AccountStore;
pub use event_bus::{BusError, EventBus, EventStream};
pub use throughput_meter::ThroughputMeter;
