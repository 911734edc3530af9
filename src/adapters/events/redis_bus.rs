//! Redis-backed event bus for production deployments.
//!
//! Publishes with `PUBLISH` over one multiplexed connection shared by all
//! callers, and subscribes by opening a dedicated pub/sub connection per
//! subscription whose messages are decoded by a background delivery task.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use crate::domain::event::{codec, Event, TopicPolicy};
use crate::domain::foundation::AccountId;
use crate::ports::{BusError, EventBus, EventStream};

use super::delivery::spawn_delivery;

/// Default per-subscription buffer between the delivery task and consumer.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Redis pub/sub implementation of [`EventBus`].
///
/// The publishing connection is established at most once; call
/// [`RedisEventBus::connect`] at startup so an unreachable broker fails the
/// process instead of the first request.
pub struct RedisEventBus {
    client: redis::Client,
    connection: OnceCell<MultiplexedConnection>,
    policy: TopicPolicy,
    connect_timeout: Duration,
    subscriber_buffer: usize,
}

impl RedisEventBus {
    /// Create a bus for the broker at `url` without connecting.
    pub fn open(url: &str, policy: TopicPolicy) -> Result<Self, BusError> {
        let client = redis::Client::open(url).map_err(transport)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            policy,
            connect_timeout: Duration::from_secs(5),
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        })
    }

    /// Set how long the initial handshake may take.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-subscription buffer size.
    pub fn with_subscriber_buffer(mut self, buffer: usize) -> Self {
        self.subscriber_buffer = buffer;
        self
    }

    pub fn policy(&self) -> &TopicPolicy {
        &self.policy
    }

    /// Establish the publishing connection and verify it with `PING`.
    ///
    /// Idempotent: concurrent and repeated calls share one handshake.
    pub async fn connect(&self) -> Result<(), BusError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<MultiplexedConnection, BusError> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                let handshake = async {
                    let mut conn = self
                        .client
                        .get_multiplexed_tokio_connection()
                        .await
                        .map_err(transport)?;
                    let pong: String = redis::cmd("PING")
                        .query_async(&mut conn)
                        .await
                        .map_err(transport)?;
                    tracing::info!(reply = %pong, "Connected to Redis broker");
                    Ok::<_, BusError>(conn)
                };

                tokio::time::timeout(self.connect_timeout, handshake)
                    .await
                    .map_err(|_| {
                        BusError::Transport(format!(
                            "broker handshake timed out after {:?}",
                            self.connect_timeout
                        ))
                    })?
            })
            .await?;

        Ok(conn.clone())
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, account_id: AccountId, data: &str) -> Result<(), BusError> {
        let event = Event::for_account(account_id, data);
        let payload = codec::encode(&event)?;
        let topic = self.policy.publish_topic(account_id);

        let mut conn = self.connection().await?;
        let receivers: i64 = conn.publish(&topic, payload).await.map_err(transport)?;

        tracing::debug!(
            account_id = %account_id,
            topic = %topic,
            receivers,
            "Event published"
        );
        Ok(())
    }

    async fn subscribe(&self, accounts: &[AccountId]) -> Result<EventStream, BusError> {
        let topics = self.policy.subscribe_topics(accounts);
        if topics.is_empty() {
            return Err(BusError::NoTopics);
        }

        let mut pubsub = self
            .client
            .get_async_connection()
            .await
            .map_err(transport)?
            .into_pubsub();
        for topic in &topics {
            pubsub.subscribe(topic).await.map_err(transport)?;
        }

        tracing::info!(topics = ?topics, "Subscribed to Redis channels");

        let messages = pubsub
            .into_on_message()
            .map(|msg| msg.get_payload_bytes().to_vec());

        Ok(spawn_delivery(messages, topics, self.subscriber_buffer))
    }
}

impl std::fmt::Debug for RedisEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventBus")
            .field("policy", &self.policy)
            .field("connected", &self.connection.initialized())
            .field("subscriber_buffer", &self.subscriber_buffer)
            .finish_non_exhaustive()
    }
}

fn transport(e: redis::RedisError) -> BusError {
    BusError::Transport(e.to_string())
}
