//! Simulated I/O latency
//!
//! The store can pause for a random 1..=N milliseconds before each key
//! listing, read and write. This widens the windows in which concurrent
//! transactions interleave, which makes conflicts reproducible in tests and
//! demos. Merges never pause.

use std::time::Duration;

use rand::Rng;

/// Random per-operation delay applied by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoLatency {
    max: Option<Duration>,
}

impl IoLatency {
    /// No delay
    pub const fn disabled() -> Self {
        IoLatency { max: None }
    }

    /// Delay each operation by a random duration in `1ms..=max`
    ///
    /// A `max` below one millisecond disables the delay.
    pub fn up_to(max: Duration) -> Self {
        if max < Duration::from_millis(1) {
            IoLatency::disabled()
        } else {
            IoLatency { max: Some(max) }
        }
    }

    /// Delay of `1..=max_ms` milliseconds; `0` disables it
    pub fn from_millis(max_ms: u64) -> Self {
        IoLatency::up_to(Duration::from_millis(max_ms))
    }

    /// Whether any delay is applied
    pub fn is_enabled(&self) -> bool {
        self.max.is_some()
    }

    /// Upper bound of the delay, if enabled
    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Sleep for a random duration within the configured bound
    ///
    /// Must not be called while holding a store lock.
    pub fn pause(&self) {
        if let Some(max) = self.max {
            let upper = max.as_millis().max(1) as u64;
            let ms = rand::thread_rng().gen_range(1..=upper);
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}
