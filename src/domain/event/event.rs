//! The account event value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp};

/// Account ID carried by synthetic error events.
///
/// Consumers treat any ID below 1 as an error marker, this is the one the
/// service itself produces.
pub const ERROR_SENTINEL: i32 = 0;

/// A single event published for an account.
///
/// Events are immutable value objects: no identity beyond their fields, no
/// sequence numbers, no deduplication. An event whose account ID is not a
/// positive integer is a sentinel error event; its `data` is the error
/// message and its timestamp is when the error was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    account_id: i32,
    timestamp: Timestamp,
    data: String,
}

impl Event {
    /// Creates an event for an account stamped with the current time.
    pub fn for_account(account_id: AccountId, data: impl Into<String>) -> Self {
        Self::recorded_at(account_id, Timestamp::now(), data)
    }

    /// Creates an event for an account with an explicit timestamp.
    pub fn recorded_at(account_id: AccountId, timestamp: Timestamp, data: impl Into<String>) -> Self {
        Self {
            account_id: account_id.as_i32(),
            timestamp,
            data: data.into(),
        }
    }

    /// Creates a sentinel error event carrying `message`, stamped now.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            account_id: ERROR_SENTINEL,
            timestamp: Timestamp::now(),
            data: message.into(),
        }
    }

    /// Raw account ID as carried on the wire.
    pub fn account_id(&self) -> i32 {
        self.account_id
    }

    /// The account this event belongs to, or `None` for error events.
    pub fn account(&self) -> Option<AccountId> {
        AccountId::new(self.account_id).ok()
    }

    /// True for sentinel error events.
    pub fn is_error(&self) -> bool {
        self.account_id < 1
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}
