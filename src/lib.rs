//! Account Tracker - gated account events over a shared pub/sub bus
//!
//! Accounts live in PostgreSQL. The HTTP gateway publishes events for
//! active accounts to Redis, and the operator CLI watches the live stream
//! for a chosen set of accounts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
