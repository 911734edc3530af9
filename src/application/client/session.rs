//! Operator session: the selection plus one subscription at a time.
//!
//! The session is `Idle` until the operator starts listening. While
//! `Listening` it owns exactly one subscription and renders the events the
//! operator asked for. Leaving `Listening` on any path drops the
//! subscription, including when the listen future itself is dropped.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::domain::account::{Selection, SelectionReport};
use crate::ports::{BusError, EventBus, EventStream};

use super::render::format_event;

/// Consumer state over one subscription lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Idle,
    Listening,
}

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("no accounts selected, use \"accounts\" first")]
    EmptySelection,

    #[error("failed to subscribe: {0}")]
    Subscribe(#[from] BusError),

    #[error("failed to write event: {0}")]
    Output(#[from] std::io::Error),
}

/// Why a listen call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenEnd {
    /// The operator cancelled.
    Cancelled,
    /// The delivery task stopped.
    StreamClosed,
}

/// Counters for one listen call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenSummary {
    pub rendered: u64,
    pub dropped: u64,
    pub end: ListenEnd,
}

/// An operator's client session.
pub struct ClientSession {
    bus: Arc<dyn EventBus>,
    selection: Selection,
    state: ConsumerState,
}

impl ClientSession {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            selection: Selection::new(),
            state: ConsumerState::Idle,
        }
    }

    pub fn state(&self) -> ConsumerState {
        self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Add the valid tokens to the selection. See [`Selection::select`].
    pub fn select<I, S>(&mut self, tokens: I) -> SelectionReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selection.select(tokens)
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// Whether [`listen`](Self::listen) would get past its selection check.
    pub fn ready_to_listen(&self) -> Result<(), ConsumerError> {
        if self.selection.is_empty() {
            return Err(ConsumerError::EmptySelection);
        }
        Ok(())
    }

    /// Listen until `cancel` resolves or the stream ends.
    ///
    /// Error events are always rendered; account events only when the
    /// account is selected. Everything else is dropped.
    pub async fn listen<W, C>(
        &mut self,
        out: &mut W,
        cancel: C,
    ) -> Result<ListenSummary, ConsumerError>
    where
        W: AsyncWrite + Unpin,
        C: Future<Output = ()>,
    {
        self.ready_to_listen()?;

        let Self {
            bus,
            selection,
            state,
        } = self;

        let stream = bus.subscribe(&selection.ids()).await?;
        let _listening = Listening::enter(state);
        tracing::info!(accounts = selection.len(), topics = ?stream.topics(), "Listening for events");

        let summary = pump(stream, selection, out, cancel).await?;
        tracing::info!(
            rendered = summary.rendered,
            dropped = summary.dropped,
            end = ?summary.end,
            "Stopped listening"
        );
        Ok(summary)
    }
}

/// Holds the session in `Listening`; dropping it returns to `Idle`.
struct Listening<'a> {
    state: &'a mut ConsumerState,
}

impl<'a> Listening<'a> {
    fn enter(state: &'a mut ConsumerState) -> Self {
        *state = ConsumerState::Listening;
        Self { state }
    }
}

impl Drop for Listening<'_> {
    fn drop(&mut self) {
        *self.state = ConsumerState::Idle;
    }
}

// Takes the stream by value so it is dropped on every return path.
async fn pump<W, C>(
    mut stream: EventStream,
    selection: &Selection,
    out: &mut W,
    cancel: C,
) -> Result<ListenSummary, ConsumerError>
where
    W: AsyncWrite + Unpin,
    C: Future<Output = ()>,
{
    tokio::pin!(cancel);
    let mut rendered = 0;
    let mut dropped = 0;

    let end = loop {
        tokio::select! {
            _ = &mut cancel => break ListenEnd::Cancelled,
            next = stream.recv() => match next {
                Some(event) if event.is_error() || selection.contains_raw(event.account_id()) => {
                    let mut line = format_event(&event);
                    line.push('\n');
                    out.write_all(line.as_bytes()).await?;
                    out.flush().await?;
                    rendered += 1;
                }
                Some(_) => dropped += 1,
                None => break ListenEnd::StreamClosed,
            },
        }
    };

    Ok(ListenSummary {
        rendered,
        dropped,
        end,
    })
}
