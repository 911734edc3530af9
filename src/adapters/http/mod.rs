//! HTTP adapters - REST API for the tracker.
//!
//! - `accounts` - account CRUD and the event publish trigger
//! - `router` - assembles the full API with tracing and timeouts

pub mod accounts;
mod router;

pub use accounts::AccountAppState;
pub use router::app_router;
