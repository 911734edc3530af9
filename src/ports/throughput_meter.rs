//! Throughput meter port - rolling count of confirmed publishes.

/// A best-effort gauge of recent activity.
///
/// Must tolerate concurrent `record` calls from detached publish tasks
/// alongside concurrent `current` reads from the metrics endpoint.
pub trait ThroughputMeter: Send + Sync {
    /// Count one confirmed occurrence now.
    fn record(&self);

    /// Occurrences within the trailing window at the moment of the call.
    fn current(&self) -> u64;
}
