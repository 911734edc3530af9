//! Application layer - Handlers and the operator client.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `handlers` serves the HTTP surface; `client` drives the operator CLI.

pub mod client;
pub mod handlers;

pub use client::{ClientCommand, ClientSession, ConsumerError, ConsumerState};
pub use handlers::{
    CreateAccountCommand, CreateAccountHandler, DeactivateAccountCommand,
    DeactivateAccountHandler, Dispatch, GetAccountHandler, GetAccountQuery, PublishError,
    PublishEventCommand, PublishEventHandler,
};
