//! Non-decreasing wall clock for message timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Returns `max(now, last returned)` so timestamps never go backwards.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    /// Create a clock with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time, clamped to the last value handed out.
    pub fn now(&self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    fn observe(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let micros = wall.timestamp_micros();
        let prev = self.last_micros.fetch_max(micros, Ordering::SeqCst);
        if prev > micros {
            DateTime::from_timestamp_micros(prev).unwrap_or(wall)
        } else {
            wall
        }
    }
}
