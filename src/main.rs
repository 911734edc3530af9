//! Account tracker server - HTTP gateway over the account store and bus.
//!
//! Starts an axum HTTP server with structured logging, account table
//! bootstrap, an eager broker handshake, and graceful shutdown on
//! SIGTERM/SIGINT.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use account_tracker::adapters::http::{app_router, AccountAppState};
use account_tracker::adapters::{PostgresAccountStore, RedisEventBus, SlidingWindowCounter};
use account_tracker::config::AppConfig;

const PUBLISH_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = AppConfig::load()
        .expect("failed to load configuration - set ACCOUNT_TRACKER__DATABASE__URL");

    init_tracing(&config.server.log_level, config.server.log_json);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }

    // Account store
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await
        .expect("failed to connect to PostgreSQL - check ACCOUNT_TRACKER__DATABASE__URL");

    let store = PostgresAccountStore::new(pool);
    let seeded = store
        .ensure_schema(config.database.seed_accounts)
        .await
        .expect("failed to prepare the account table");
    if seeded > 0 {
        tracing::info!(count = seeded, "seeded accounts");
    }

    // Broker: a failed handshake is fatal
    let policy = config.bus.topic_policy();
    let bus = RedisEventBus::open(&config.redis.url, policy.clone())
        .expect("invalid Redis URL")
        .with_connect_timeout(config.redis.timeout())
        .with_subscriber_buffer(config.bus.subscriber_buffer);
    if let Err(e) = bus.connect().await {
        tracing::error!(error = %e, url = %config.redis.url, "cannot reach Redis");
        std::process::exit(1);
    }
    tracing::info!(policy = ?policy, "connected to Redis");

    let state = AccountAppState::new(
        Arc::new(store),
        Arc::new(bus),
        Arc::new(SlidingWindowCounter::per_second()),
        config.bus.origin_tag.clone(),
    );
    let app = app_router(state.clone(), config.server.request_timeout());

    let addr = config
        .server
        .socket_addr()
        .expect("server address was validated above");
    tracing::info!(%addr, "starting account tracker");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address - is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Publishes dispatched by the last requests are still running
    if !state.drain_publishes(PUBLISH_DRAIN_TIMEOUT).await {
        tracing::warn!("shutting down with publishes still in flight");
    }

    tracing::info!("account tracker shut down");
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
