//! Account HTTP adapter - CRUD plus the event publish trigger.

pub mod dto;
mod handlers;
mod routes;

pub use dto::{
    AccountResponse, CreateAccountRequest, ErrorResponse, MetricsResponse, PublishEventQuery,
};
pub use handlers::AccountAppState;
pub use routes::account_routes;

pub(crate) use handlers::{health, metrics};
