//! Operator client - selection, listening, and rendering.
//!
//! - `ClientSession` - the selection and the Idle/Listening state machine
//! - `ClientCommand` - commands typed at the prompt
//! - `format_event` - one line per delivered event

mod command;
mod render;
mod session;

pub use command::{ClientCommand, UnknownCommand, HELP};
pub use render::format_event;
pub use session::{ClientSession, ConsumerError, ConsumerState, ListenEnd, ListenSummary};
