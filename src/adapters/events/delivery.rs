//! Subscription delivery task.
//!
//! Both bus adapters hand their raw inbound message stream to
//! [`spawn_delivery`], which owns the producer end of the subscriber's
//! channel for the lifetime of the subscription.
//!
//! ```text
//!  broker messages ──► decode ──ok──► Event ──┐
//!                         │                   ├──► mpsc ──► EventStream
//!                         └─err─► sentinel ───┘
//! ```
//!
//! ## Shutdown
//!
//! The task exits when the broker stream ends, when the subscriber signals
//! shutdown through the watch channel (dropping the `EventStream` does
//! this), or when the receiving half is gone. A malformed message never
//! stops it.

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::domain::event::{codec, Event};
use crate::ports::EventStream;

/// Why a delivery task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEnd {
    /// The broker closed the message stream.
    BrokerClosed,
    /// The subscriber closed or dropped its stream.
    SubscriberClosed,
}

/// Counters reported when a delivery task stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub malformed: u64,
    pub end: DeliveryEnd,
}

/// Spawn a delivery task over `messages` and return the subscriber's stream.
pub fn spawn_delivery<S>(messages: S, topics: Vec<String>, buffer: usize) -> EventStream
where
    S: Stream<Item = Vec<u8>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task_topics = topics.clone();
    tokio::spawn(async move {
        let stats = deliver(messages, tx, shutdown_rx).await;
        tracing::info!(
            topics = ?task_topics,
            delivered = stats.delivered,
            malformed = stats.malformed,
            end = ?stats.end,
            "Subscription delivery stopped"
        );
    });

    EventStream::new(rx, shutdown_tx, topics)
}

/// Decode and forward messages until the broker or the subscriber is done.
///
/// Forwarding waits for channel capacity; a subscriber that stops draining
/// without closing stalls delivery rather than losing events.
pub async fn deliver<S>(
    messages: S,
    tx: mpsc::Sender<Event>,
    mut shutdown: watch::Receiver<bool>,
) -> DeliveryStats
where
    S: Stream<Item = Vec<u8>>,
{
    futures::pin_mut!(messages);

    let mut delivered = 0;
    let mut malformed = 0;

    let end = loop {
        let payload = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break DeliveryEnd::SubscriberClosed;
                }
                continue;
            }
            next = messages.next() => match next {
                Some(payload) => payload,
                None => break DeliveryEnd::BrokerClosed,
            },
        };

        let event = match codec::decode(&payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bytes = payload.len(),
                    "Undecodable event, forwarding error event"
                );
                malformed += 1;
                Event::error(e.to_string())
            }
        };

        if tx.send(event).await.is_err() {
            break DeliveryEnd::SubscriberClosed;
        }
        delivered += 1;
    };

    DeliveryStats {
        delivered,
        malformed,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::encode;
    use crate::domain::foundation::AccountId;
    use futures::stream;
    use std::time::Duration;

    fn encoded(id: i32, data: &str) -> Vec<u8> {
        encode(&Event::for_account(AccountId::new(id).unwrap(), data)).unwrap()
    }

    #[tokio::test]
    async fn malformed_message_becomes_one_error_event_and_stream_continues() {
        let messages = stream::iter(vec![
            encoded(1, "first"),
            b"{not json".to_vec(),
            encoded(2, "second"),
        ]);
        let (tx, mut rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let stats = deliver(messages, tx, shutdown_rx).await;

        let first = rx.recv().await.unwrap();
        let error = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();

        assert_eq!(first.data(), "first");
        assert!(error.is_error());
        assert!(error.data().contains("malformed"));
        assert_eq!(second.data(), "second");
        assert_eq!(stats.delivered, 3);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.end, DeliveryEnd::BrokerClosed);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_idle_task() {
        let (tx, _rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(deliver(stream::pending::<Vec<u8>>(), tx, shutdown_rx));
        shutdown_tx.send(true).unwrap();

        let stats = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("delivery task did not stop")
            .unwrap();
        assert_eq!(stats.end, DeliveryEnd::SubscriberClosed);
    }

    #[tokio::test]
    async fn dropped_receiver_stops_task() {
        let (tx, rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(rx);

        let stats = deliver(stream::iter(vec![encoded(1, "x")]), tx, shutdown_rx).await;

        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.end, DeliveryEnd::SubscriberClosed);
    }

    #[tokio::test]
    async fn spawned_delivery_feeds_event_stream() {
        let mut events = spawn_delivery(
            stream::iter(vec![encoded(9, "hello")]),
            vec!["events".to_string()],
            4,
        );

        let event = events.recv().await.unwrap();
        assert_eq!(event.account_id(), 9);
        assert!(events.recv().await.is_none());
        assert_eq!(events.topics(), ["events".to_string()]);
    }
}
