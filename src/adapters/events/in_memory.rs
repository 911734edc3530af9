//! In-memory event bus for tests and single-process runs.
//!
//! Messages go through the real codec and the same delivery task as the
//! Redis adapter, over a `tokio::sync::broadcast` channel standing in for
//! the broker.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::broadcast;

use crate::domain::event::{codec, Event, TopicPolicy};
use crate::domain::foundation::AccountId;
use crate::ports::{BusError, EventBus, EventStream};

use super::delivery::spawn_delivery;
use super::redis_bus::DEFAULT_SUBSCRIBER_BUFFER;

const BROKER_CAPACITY: usize = 1024;

/// In-memory event bus.
///
/// Features:
/// - Same wire encoding and decode-failure handling as production
/// - Published event capture for assertions
/// - Switchable publish failure to exercise transport error paths
/// - Raw message injection to exercise malformed payloads
pub struct InMemoryEventBus {
    broker: broadcast::Sender<(String, Vec<u8>)>,
    policy: TopicPolicy,
    published: Mutex<Vec<Event>>,
    fail_publishes: AtomicBool,
}

impl InMemoryEventBus {
    /// Creates a bus using the shared topic policy.
    pub fn new() -> Self {
        Self::with_policy(TopicPolicy::shared())
    }

    pub fn with_policy(policy: TopicPolicy) -> Self {
        let (broker, _) = broadcast::channel(BROKER_CAPACITY);
        Self {
            broker,
            policy,
            published: Mutex::new(Vec::new()),
            fail_publishes: AtomicBool::new(false),
        }
    }

    // === Test Helpers ===

    /// Make subsequent publishes fail with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.fail_publishes.store(unreachable, Ordering::SeqCst);
    }

    /// Put a raw message on a topic, bypassing the encoder.
    pub fn inject_raw(&self, topic: &str, payload: impl Into<Vec<u8>>) {
        let _ = self.broker.send((topic.to_string(), payload.into()));
    }

    /// Returns all successfully published events.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn published_events(&self) -> Vec<Event> {
        self.published
            .lock()
            .expect("InMemoryEventBus: published lock poisoned")
            .clone()
    }

    /// Returns count of successfully published events.
    pub fn event_count(&self) -> usize {
        self.published_events().len()
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.broker.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, account_id: AccountId, data: &str) -> Result<(), BusError> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(BusError::Transport("broker unreachable".to_string()));
        }

        let event = Event::for_account(account_id, data);
        let payload = codec::encode(&event)?;
        let topic = self.policy.publish_topic(account_id);

        // Like Redis PUBLISH, a message nobody listens to is not an error.
        let _ = self.broker.send((topic, payload));

        self.published
            .lock()
            .expect("InMemoryEventBus: published lock poisoned")
            .push(event);
        Ok(())
    }

    async fn subscribe(&self, accounts: &[AccountId]) -> Result<EventStream, BusError> {
        let topics = self.policy.subscribe_topics(accounts);
        if topics.is_empty() {
            return Err(BusError::NoTopics);
        }

        let receiver = self.broker.subscribe();
        let wanted = topics.clone();
        let messages = stream::unfold(receiver, move |mut receiver| {
            let wanted = wanted.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok((topic, payload)) if wanted.contains(&topic) => {
                            return Some((payload, receiver));
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "In-memory subscriber lagged");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(spawn_delivery(messages, topics, DEFAULT_SUBSCRIBER_BUFFER))
    }
}
