//! Account command and query handlers.

mod create_account;
mod deactivate_account;
mod get_account;

pub use create_account::{CreateAccountCommand, CreateAccountHandler};
pub use deactivate_account::{DeactivateAccountCommand, DeactivateAccountHandler};
pub use get_account::{GetAccountHandler, GetAccountQuery};
