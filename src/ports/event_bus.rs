//! EventBus port - publish/subscribe over a shared broker.
//!
//! This port hides the broker from the publish gateway and the client
//! consumer. Delivery is at-most-once with no replay: a subscriber opened
//! after a publish never sees that event.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::domain::event::{EncodeError, Event};
use crate::domain::foundation::AccountId;

/// Errors raised by bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// The broker rejected the operation or could not be reached.
    #[error("broker transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A per-account subscription was requested without any accounts.
    #[error("at least one account ID is required to subscribe")]
    NoTopics,
}

/// Port for publishing and subscribing to account events.
///
/// Implementations must be safe for concurrent use: publishes from many
/// request tasks share one broker connection with the open subscriptions.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish `data` for `account_id`, stamped with the current UTC time.
    ///
    /// Resolves once the broker accepted the message. Failures are returned
    /// as-is and never retried here.
    async fn publish(&self, account_id: AccountId, data: &str) -> Result<(), BusError>;

    /// Open a subscription.
    ///
    /// `accounts` names the accounts of interest. Under a shared topic the
    /// stream carries every account's events and the caller filters; under
    /// per-account topics only the named accounts are delivered.
    async fn subscribe(&self, accounts: &[AccountId]) -> Result<EventStream, BusError>;
}

/// A live subscription.
///
/// Produced by a background delivery task that owns the sending half.
/// Dropping the stream (or calling [`EventStream::close`]) signals that
/// task to stop and release its broker channel.
pub struct EventStream {
    receiver: mpsc::Receiver<Event>,
    shutdown: watch::Sender<bool>,
    topics: Vec<String>,
}

impl EventStream {
    /// Wraps the consumer end of a delivery task.
    ///
    /// The task must stop once `shutdown` flips to `true` or its sender is
    /// dropped.
    pub fn new(
        receiver: mpsc::Receiver<Event>,
        shutdown: watch::Sender<bool>,
        topics: Vec<String>,
    ) -> Self {
        Self {
            receiver,
            shutdown,
            topics,
        }
    }

    /// Wait for the next event. `None` once the delivery task has exited.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Broker channels this subscription listens on.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Stop the delivery task and release the subscription.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        tracing::debug!(topics = ?self.topics, "Subscription closed");
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("topics", &self.topics)
            .finish_non_exhaustive()
    }
}
