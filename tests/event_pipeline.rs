//! Integration tests for the event pipeline.
//!
//! These tests drive the public API end to end with in-memory adapters:
//! 1. HTTP publish trigger gates on account state and dispatches to the bus
//! 2. The bus encodes, fans out, and decodes (including malformed messages)
//! 3. The client session filters the stream down to the operator's selection

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tower::ServiceExt;

use account_tracker::adapters::http::{app_router, AccountAppState};
use account_tracker::adapters::{InMemoryAccountStore, InMemoryEventBus, SlidingWindowCounter};
use account_tracker::application::client::{ClientSession, ConsumerState, ListenEnd};
use account_tracker::domain::account::Account;
use account_tracker::domain::event::TopicPolicy;
use account_tracker::domain::foundation::AccountId;
use account_tracker::ports::{BusError, EventBus, ThroughputMeter};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn id(raw: i32) -> AccountId {
    AccountId::new(raw).unwrap()
}

fn store_with(accounts: &[(i32, bool)]) -> InMemoryAccountStore {
    InMemoryAccountStore::with_accounts(accounts.iter().map(|&(raw, is_active)| Account {
        id: id(raw),
        name: format!("account-{}", raw),
        is_active,
    }))
}

fn router(
    store: InMemoryAccountStore,
    bus: Arc<InMemoryEventBus>,
    meter: Arc<SlidingWindowCounter>,
    origin: Option<&str>,
) -> Router {
    let state = AccountAppState::new(
        Arc::new(store),
        bus,
        meter,
        origin.map(str::to_string),
    );
    app_router(state, Duration::from_secs(5))
}

async fn put_event(app: &Router, account: &str, data: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/accounts/{}/events?data={}", account, data))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn published_events_reach_a_filtering_client() {
    let bus = Arc::new(InMemoryEventBus::new());
    let meter = Arc::new(SlidingWindowCounter::per_second());
    let app = router(
        store_with(&[(1, true), (2, true), (7, true)]),
        bus.clone(),
        meter.clone(),
        Some("gw-1"),
    );

    let mut session = ClientSession::new(bus.clone());
    let report = session.select(["7", "1"]);
    assert!(report.rejected.is_empty());

    let (mut writer, reader) = tokio::io::duplex(16 * 1024);
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let listener = tokio::spawn(async move {
        let summary = session
            .listen(&mut writer, async {
                let _ = cancel_rx.await;
            })
            .await;
        (session, summary)
    });

    eventually(|| bus.subscriber_count() == 1).await;

    assert_eq!(put_event(&app, "1", "first").await, StatusCode::ACCEPTED);
    assert_eq!(put_event(&app, "2", "hidden").await, StatusCode::ACCEPTED);
    assert_eq!(put_event(&app, "7", "second").await, StatusCode::ACCEPTED);
    eventually(|| bus.event_count() == 3).await;
    eventually(|| meter.current() == 3).await;

    bus.inject_raw("events", b"{not json".to_vec());
    bus.publish(id(7), "last").await.unwrap();

    let mut lines = BufReader::new(reader).lines();
    let mut seen = Vec::new();
    while seen.len() < 4 {
        let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .expect("timed out waiting for events")
            .unwrap()
            .expect("output closed early");
        seen.push(line);
    }

    assert!(seen.iter().any(|l| l.ends_with("[1]: first [origin: gw-1]")));
    assert!(seen.iter().any(|l| l.ends_with("[7]: second [origin: gw-1]")));
    assert!(seen.iter().any(|l| l.contains("[error]")));
    assert!(seen[3].ends_with("[7]: last"));
    assert!(!seen.iter().any(|l| l.contains("hidden")));

    cancel_tx.send(()).unwrap();
    let (session, summary) = listener.await.unwrap();
    let summary = summary.unwrap();

    assert_eq!(summary.end, ListenEnd::Cancelled);
    assert_eq!(summary.rendered, 4);
    assert_eq!(summary.dropped, 1);
    assert_eq!(session.state(), ConsumerState::Idle);

    eventually(|| bus.subscriber_count() == 0).await;
}

#[tokio::test]
async fn rejected_publishes_never_reach_subscribers() {
    let bus = Arc::new(InMemoryEventBus::new());
    let meter = Arc::new(SlidingWindowCounter::per_second());
    let app = router(
        store_with(&[(1, true), (2, false)]),
        bus.clone(),
        meter.clone(),
        None,
    );
    let mut stream = bus.subscribe(&[]).await.unwrap();

    assert_eq!(put_event(&app, "2", "x").await, StatusCode::CONFLICT);
    assert_eq!(put_event(&app, "99", "x").await, StatusCode::NOT_FOUND);
    assert_eq!(put_event(&app, "nope", "x").await, StatusCode::BAD_REQUEST);
    assert_eq!(put_event(&app, "1", "").await, StatusCode::BAD_REQUEST);
    assert_eq!(put_event(&app, "1", "ok").await, StatusCode::ACCEPTED);

    let event = tokio::time::timeout(Duration::from_secs(2), stream.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.account_id(), 1);
    assert_eq!(event.data(), "ok");
    assert_eq!(bus.event_count(), 1);
    eventually(|| meter.current() == 1).await;
}

#[tokio::test]
async fn per_account_policy_fans_out_on_the_broker() {
    let bus = InMemoryEventBus::with_policy(TopicPolicy::per_account());

    assert!(matches!(bus.subscribe(&[]).await, Err(BusError::NoTopics)));

    let mut stream = bus.subscribe(&[id(3)]).await.unwrap();
    assert_eq!(stream.topics(), ["account.3".to_string()]);

    bus.publish(id(4), "other").await.unwrap();
    bus.publish(id(3), "mine").await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), stream.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.account_id(), 3);
    assert_eq!(event.data(), "mine");
}

#[tokio::test]
async fn selection_reports_each_invalid_token() {
    let mut session = ClientSession::new(Arc::new(InMemoryEventBus::new()));

    let report = session.select(["1", "7", "asd", "0", "-1", "3"]);

    let selected: Vec<i32> = report.selected.iter().map(|id| id.as_i32()).collect();
    assert_eq!(selected, vec![1, 3, 7]);
    let rejected: Vec<&str> = report.rejected.iter().map(|t| t.token.as_str()).collect();
    assert_eq!(rejected, vec!["asd", "0", "-1"]);

    let report = session.select(["3", "3"]);
    assert_eq!(report.selected.len(), 3);
}

#[tokio::test]
async fn shutdown_drain_waits_for_dispatched_publishes() {
    let bus = Arc::new(InMemoryEventBus::new());
    let meter = Arc::new(SlidingWindowCounter::per_second());
    let state = AccountAppState::new(
        Arc::new(store_with(&[(1, true)])),
        bus.clone(),
        meter.clone(),
        None,
    );
    let app = app_router(state.clone(), Duration::from_secs(5));

    for data in ["a", "b", "c"] {
        assert_eq!(put_event(&app, "1", data).await, StatusCode::ACCEPTED);
    }
    drop(app);

    assert!(state.drain_publishes(Duration::from_secs(2)).await);
    assert_eq!(bus.event_count(), 3);
    assert_eq!(meter.current(), 3);
}
