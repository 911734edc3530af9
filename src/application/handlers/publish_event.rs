//! PublishEventHandler - the publish gateway.
//!
//! Turns a "post event for account X" request into a gated, detached bus
//! publish. Validation and account-state checks run on the caller's task
//! and short-circuit before anything reaches the bus. The publish itself
//! runs on its own task; its outcome only ever reaches the logs and the
//! throughput meter. Shutdown calls [`PublishEventHandler::drain`] so those
//! tasks finish before the runtime goes away.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::domain::foundation::{AccountId, DomainError, ValidationError};
use crate::ports::{AccountStore, EventBus, ThroughputMeter};

/// Command to publish an event for an account.
#[derive(Debug, Clone)]
pub struct PublishEventCommand {
    /// Raw account identifier as it arrived on the route.
    pub account_id: String,
    /// Event payload; `None` when the request carried none.
    pub data: Option<String>,
}

/// Gateway failures. None of these reach the bus.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid account identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("account lookup failed: {0}")]
    LookupFailed(DomainError),

    #[error("account {0} is not active")]
    AccountInactive(AccountId),

    #[error("event data must not be empty")]
    MissingPayload,
}

/// Handle on a detached publish.
///
/// Dropping it does not cancel the publish.
#[derive(Debug)]
pub struct Dispatch {
    account_id: AccountId,
    task: JoinHandle<bool>,
}

impl Dispatch {
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Wait for the publish to finish. Returns whether the broker confirmed it.
    pub async fn confirmed(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

/// Count of dispatched publishes that have not finished yet.
#[derive(Default)]
struct InFlight {
    pending: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.pending.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Held by a publish task; released when the task ends, panics included.
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Handler for the publish trigger.
pub struct PublishEventHandler {
    store: Arc<dyn AccountStore>,
    bus: Arc<dyn EventBus>,
    meter: Arc<dyn ThroughputMeter>,
    origin_tag: Option<String>,
    in_flight: Arc<InFlight>,
}

impl PublishEventHandler {
    pub fn new(
        store: Arc<dyn AccountStore>,
        bus: Arc<dyn EventBus>,
        meter: Arc<dyn ThroughputMeter>,
    ) -> Self {
        Self {
            store,
            bus,
            meter,
            origin_tag: None,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Append ` [origin: <tag>]` to every published payload.
    pub fn with_origin_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.origin_tag = (!tag.trim().is_empty()).then_some(tag);
        self
    }

    /// Publishes dispatched but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.pending()
    }

    /// Wait up to `timeout` for every dispatched publish to finish.
    ///
    /// Returns `false` if some were still running when the timeout hit.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let pending = self.in_flight.pending();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight publishes");
        }
        match tokio::time::timeout(timeout, self.in_flight.wait_idle()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    pending = self.in_flight.pending(),
                    "Gave up waiting for in-flight publishes"
                );
                false
            }
        }
    }

    pub async fn handle(&self, cmd: PublishEventCommand) -> Result<Dispatch, PublishError> {
        // 1. Resolve account
        let account_id: AccountId = cmd.account_id.trim().parse()?;

        // 2. Gate on account state
        let active = self
            .store
            .is_active(account_id)
            .await
            .map_err(PublishError::LookupFailed)?;
        if !active {
            return Err(PublishError::AccountInactive(account_id));
        }

        // 3. Payload
        let data = cmd
            .data
            .filter(|d| !d.is_empty())
            .ok_or(PublishError::MissingPayload)?;

        // 4. Annotate
        let payload = match &self.origin_tag {
            Some(tag) => format!("{} [origin: {}]", data, tag),
            None => data,
        };

        // 5. Dispatch off the request path
        let bus = Arc::clone(&self.bus);
        let meter = Arc::clone(&self.meter);
        let guard = self.in_flight.enter();
        let task = tokio::spawn(async move {
            let _guard = guard;
            match bus.publish(account_id, &payload).await {
                Ok(()) => {
                    // 6. Meter confirmed publishes only
                    meter.record();
                    true
                }
                Err(e) => {
                    tracing::error!(account_id = %account_id, error = %e, "Failed to publish event");
                    false
                }
            }
        });

        Ok(Dispatch { account_id, task })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::metrics::SlidingWindowCounter;
    use crate::domain::account::{Account, NewAccount};
    use crate::domain::foundation::ErrorCode;
    use crate::ports::{BusError, EventStream};
    use async_trait::async_trait;

    struct MockAccountStore {
        active: Option<bool>,
        fail: bool,
    }

    impl MockAccountStore {
        fn active() -> Self {
            Self {
                active: Some(true),
                fail: false,
            }
        }

        fn inactive() -> Self {
            Self {
                active: Some(false),
                fail: false,
            }
        }

        fn missing() -> Self {
            Self {
                active: None,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                active: None,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl AccountStore for MockAccountStore {
        async fn is_active(&self, id: AccountId) -> Result<bool, DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::DatabaseError, "connection reset"));
            }
            self.active.ok_or_else(|| {
                DomainError::new(ErrorCode::AccountNotFound, format!("Account not found: {}", id))
            })
        }

        async fn get(&self, _id: AccountId) -> Result<Option<Account>, DomainError> {
            Ok(None)
        }

        async fn create(&self, _account: NewAccount) -> Result<Account, DomainError> {
            unimplemented!("not used by the gateway")
        }

        async fn deactivate(&self, _id: AccountId) -> Result<(), DomainError> {
            Ok(())
        }
    }

    /// Bus that only counts publish attempts.
    #[derive(Default)]
    struct CountingBus {
        publishes: AtomicUsize,
    }

    #[async_trait]
    impl EventBus for CountingBus {
        async fn publish(&self, _account_id: AccountId, _data: &str) -> Result<(), BusError> {
            self.publishes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn subscribe(&self, _accounts: &[AccountId]) -> Result<EventStream, BusError> {
            Err(BusError::Transport("not supported".to_string()))
        }
    }

    /// Bus whose publishes take a while to confirm.
    #[derive(Default)]
    struct SlowBus {
        confirmed: AtomicUsize,
    }

    #[async_trait]
    impl EventBus for SlowBus {
        async fn publish(&self, _account_id: AccountId, _data: &str) -> Result<(), BusError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.confirmed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn subscribe(&self, _accounts: &[AccountId]) -> Result<EventStream, BusError> {
            Err(BusError::Transport("not supported".to_string()))
        }
    }

    fn command(id: &str, data: Option<&str>) -> PublishEventCommand {
        PublishEventCommand {
            account_id: id.to_string(),
            data: data.map(str::to_string),
        }
    }

    fn handler(
        store: MockAccountStore,
        bus: Arc<dyn EventBus>,
        meter: Arc<SlidingWindowCounter>,
    ) -> PublishEventHandler {
        PublishEventHandler::new(Arc::new(store), bus, meter)
    }

    #[tokio::test]
    async fn publishes_for_active_account_and_meters() {
        let bus = Arc::new(InMemoryEventBus::new());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter.clone());

        let dispatch = handler.handle(command("7", Some("hello"))).await.unwrap();
        assert_eq!(dispatch.account_id().as_i32(), 7);
        assert!(dispatch.confirmed().await);

        let published = bus.published_events();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].account_id(), 7);
        assert_eq!(published[0].data(), "hello");
        assert_eq!(meter.current(), 1);
    }

    #[tokio::test]
    async fn origin_tag_is_appended() {
        let bus = Arc::new(InMemoryEventBus::new());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler =
            handler(MockAccountStore::active(), bus.clone(), meter).with_origin_tag("node-a");

        let dispatch = handler.handle(command("1", Some("ping"))).await.unwrap();
        assert!(dispatch.confirmed().await);

        assert_eq!(bus.published_events()[0].data(), "ping [origin: node-a]");
    }

    #[tokio::test]
    async fn blank_origin_tag_is_ignored() {
        let bus = Arc::new(InMemoryEventBus::new());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter).with_origin_tag("  ");

        handler
            .handle(command("1", Some("ping")))
            .await
            .unwrap()
            .confirmed()
            .await;

        assert_eq!(bus.published_events()[0].data(), "ping");
    }

    #[tokio::test]
    async fn rejects_non_positive_identifiers() {
        let bus = Arc::new(CountingBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter.clone());

        for raw in ["", "abc", "0", "-4", "1.5"] {
            let result = handler.handle(command(raw, Some("x"))).await;
            assert!(
                matches!(result, Err(PublishError::InvalidIdentifier(_))),
                "{:?} should be rejected",
                raw
            );
        }
        assert_eq!(bus.publishes.load(Ordering::SeqCst), 0);
        assert_eq!(meter.current(), 0);
    }

    #[tokio::test]
    async fn inactive_account_is_never_published() {
        let bus = Arc::new(CountingBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::inactive(), bus.clone(), meter.clone());

        let result = handler.handle(command("3", Some("x"))).await;

        assert!(matches!(result, Err(PublishError::AccountInactive(id)) if id.as_i32() == 3));
        assert_eq!(bus.publishes.load(Ordering::SeqCst), 0);
        assert_eq!(meter.current(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_lookup_failed() {
        let bus = Arc::new(CountingBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());

        let failing = handler(MockAccountStore::failing(), bus.clone(), meter.clone());
        match failing.handle(command("3", Some("x"))).await {
            Err(PublishError::LookupFailed(e)) => assert_eq!(e.code, ErrorCode::DatabaseError),
            other => panic!("expected LookupFailed, got {:?}", other),
        }

        let missing = handler(MockAccountStore::missing(), bus.clone(), meter.clone());
        match missing.handle(command("3", Some("x"))).await {
            Err(PublishError::LookupFailed(e)) => assert!(e.is_not_found()),
            other => panic!("expected LookupFailed, got {:?}", other),
        }

        assert_eq!(bus.publishes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_or_absent_payload_is_rejected() {
        let bus = Arc::new(CountingBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter);

        assert!(matches!(
            handler.handle(command("2", None)).await,
            Err(PublishError::MissingPayload)
        ));
        assert!(matches!(
            handler.handle(command("2", Some(""))).await,
            Err(PublishError::MissingPayload)
        ));
        assert_eq!(bus.publishes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_not_metered() {
        let bus = Arc::new(InMemoryEventBus::new());
        bus.set_unreachable(true);
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter.clone());

        let dispatch = handler.handle(command("5", Some("lost"))).await.unwrap();

        assert!(!dispatch.confirmed().await);
        assert_eq!(bus.event_count(), 0);
        assert_eq!(meter.current(), 0);
    }

    #[tokio::test]
    async fn drain_waits_for_slow_publishes() {
        let bus = Arc::new(SlowBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter.clone());

        let first = handler.handle(command("1", Some("a"))).await.unwrap();
        let second = handler.handle(command("2", Some("b"))).await.unwrap();
        drop((first, second));
        assert_eq!(handler.in_flight(), 2);
        assert_eq!(bus.confirmed.load(Ordering::SeqCst), 0);

        assert!(handler.drain(Duration::from_secs(2)).await);

        assert_eq!(bus.confirmed.load(Ordering::SeqCst), 2);
        assert_eq!(handler.in_flight(), 0);
        assert_eq!(meter.current(), 2);
    }

    #[tokio::test]
    async fn drain_gives_up_after_timeout() {
        let bus = Arc::new(SlowBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus.clone(), meter);

        handler.handle(command("1", Some("a"))).await.unwrap();

        assert!(!handler.drain(Duration::from_millis(10)).await);
        assert_eq!(handler.in_flight(), 1);
        assert!(handler.drain(Duration::from_secs(2)).await);
        assert_eq!(bus.confirmed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drain_with_nothing_in_flight_returns_immediately() {
        let bus = Arc::new(CountingBus::default());
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus, meter);

        assert!(handler.drain(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn failed_publish_is_released_from_in_flight() {
        let bus = Arc::new(InMemoryEventBus::new());
        bus.set_unreachable(true);
        let meter = Arc::new(SlidingWindowCounter::per_second());
        let handler = handler(MockAccountStore::active(), bus, meter);

        let dispatch = handler.handle(command("5", Some("lost"))).await.unwrap();
        assert!(!dispatch.confirmed().await);

        assert!(handler.drain(Duration::from_secs(1)).await);
        assert_eq!(handler.in_flight(), 0);
    }
}
