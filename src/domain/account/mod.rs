//! Account module - stored accounts and the operator's selection.

mod account;
mod selection;

pub use account::{Account, NewAccount, MAX_NAME_LEN};
pub use selection::{InvalidSelectionToken, Selection, SelectionReport};
