//! Sliding-window occurrence counter.
//!
//! Keeps the instants of recent occurrences and drops those older than the
//! window on every access. Memory is bounded by the number of occurrences
//! within one window.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::ports::ThroughputMeter;

/// Counter over a trailing time window (one second by default).
#[derive(Debug)]
pub struct SlidingWindowCounter {
    window: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowCounter {
    /// Counter over a trailing one-second window.
    pub fn per_second() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            hits: Mutex::new(VecDeque::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an occurrence at `at`.
    ///
    /// The deque stays ordered even when `at` is older than the newest
    /// recorded instant, so front-only eviction never misses an entry.
    pub fn record_at(&self, at: Instant) {
        let mut hits = self.lock();
        Self::insert(&mut hits, at, self.window);
    }

    fn insert(hits: &mut VecDeque<Instant>, at: Instant, window: Duration) {
        Self::evict(hits, at, window);
        match hits.back() {
            Some(newest) if *newest > at => {
                let pos = hits.partition_point(|hit| *hit <= at);
                hits.insert(pos, at);
            }
            _ => hits.push_back(at),
        }
    }

    /// Occurrences within the window ending at `at`.
    pub fn count_at(&self, at: Instant) -> u64 {
        let mut hits = self.lock();
        Self::evict(&mut hits, at, self.window);
        hits.iter().filter(|hit| **hit <= at).count() as u64
    }

    fn evict(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = hits.front() {
            if now.saturating_duration_since(*oldest) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }
    }

    // Every mutation leaves the deque consistent, so poisoning is ignored.
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SlidingWindowCounter {
    fn default() -> Self {
        Self::per_second()
    }
}

impl ThroughputMeter for SlidingWindowCounter {
    fn record(&self) {
        // Read the clock under the lock so instants arrive in order
        let mut hits = self.lock();
        Self::insert(&mut hits, Instant::now(), self.window);
    }

    fn current(&self) -> u64 {
        self.count_at(Instant::now())
    }
}
