//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over the
//! ports.

pub mod account;
mod publish_event;

pub use account::{
    CreateAccountCommand, CreateAccountHandler, DeactivateAccountCommand,
    DeactivateAccountHandler, GetAccountHandler, GetAccountQuery,
};
pub use publish_event::{Dispatch, PublishError, PublishEventCommand, PublishEventHandler};
