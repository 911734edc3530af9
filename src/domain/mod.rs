//! Domain layer - value objects and rules with no I/O.

pub mod account;
pub mod event;
pub mod foundation;
