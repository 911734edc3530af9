//! Event module - the unit of data carried over the bus.
//!
//! - `Event` - immutable account event (or sentinel error event)
//! - `codec` - field-tagged wire format
//! - `TopicPolicy` - channel routing for publishers and subscribers

pub mod codec;
mod event;
mod topic;

pub use codec::{decode, encode, DecodeError, EncodeError};
pub use event::{Event, ERROR_SENTINEL};
pub use topic::{TopicPolicy, TopicPolicyKind, DEFAULT_ACCOUNT_PREFIX, DEFAULT_CHANNEL};
