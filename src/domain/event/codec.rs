//! Wire codec for events.
//!
//! Events travel as field-tagged JSON objects:
//!
//! ```text
//! {"account_id":7,"timestamp":"2024-01-15T10:30:00.123Z","data":"login"}
//! ```
//!
//! Producers and consumers do not need to agree on field order, and unknown
//! fields are ignored. Decoding never panics; malformed input yields a
//! [`DecodeError`] the subscriber turns into a sentinel event.

use thiserror::Error;

use super::Event;

/// Failure to serialize an event.
#[derive(Debug, Error)]
#[error("failed to encode event: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Failure to deserialize an inbound broker message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty event payload")]
    Empty,

    #[error("malformed event payload: {0}")]
    Malformed(String),
}

/// Encodes an event into its wire representation.
pub fn encode(event: &Event) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(event)?)
}

/// Decodes a wire message into an event.
pub fn decode(bytes: &[u8]) -> Result<Event, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }
    serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))
}
