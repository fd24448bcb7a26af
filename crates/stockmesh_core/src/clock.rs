//! Clock abstraction for mutation timestamps.
//!
//! Every successful mutation stamps `updated_at` from an injected clock,
//! which keeps last-write-wins ordering testable without sleeping.

use crate::types::TimestampMs;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps for stock mutations.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> TimestampMs;
}

/// System clock backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as TimestampMs
    }
}

/// A manually driven clock for tests.
///
/// Time only moves when `advance` or `set` is called, so tests can assert
/// strict `updated_at` ordering deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at the given timestamp.
    pub fn new(start: TimestampMs) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Moves the clock forward by `delta_ms` and returns the new time.
    pub fn advance(&self, delta_ms: TimestampMs) -> TimestampMs {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }

    /// Pins the clock to an absolute timestamp.
    pub fn set(&self, now_ms: TimestampMs) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_epoch() {
        assert!(SystemClock.now_ms() > 0);
    }

    #[test]
    fn manual_clock_only_moves_on_demand() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.now_ms(), 100);

        assert_eq!(clock.advance(50), 150);
        assert_eq!(clock.now_ms(), 150);

        clock.set(1_000);
        assert_eq!(clock.now_ms(), 1_000);
    }
}
