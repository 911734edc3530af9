//! Metrics adapters.
//!
//! - `SlidingWindowCounter` - in-process `ThroughputMeter` over a trailing window

mod sliding_window;

pub use sliding_window::SlidingWindowCounter;
