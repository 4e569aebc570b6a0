//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Total connections established
    connections_opened: AtomicU64,
    /// Total connections torn down
    connections_closed: AtomicU64,
    /// Connections currently registered
    connections_active: AtomicU64,
    /// Connections evicted by the per-identity cap
    connections_evicted: AtomicU64,
    /// Inbound events received
    events_received: AtomicU64,
    /// Frames enqueued to connections
    events_delivered: AtomicU64,
    /// Frames dropped on a full or closed queue
    events_dropped: AtomicU64,
    /// `error` events reported to clients
    errors_reported: AtomicU64,
    /// Direct messages persisted
    messages_persisted: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registered connection.
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a torn-down connection.
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Record an eviction.
    pub fn connection_evicted(&self) {
        self.connections_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound event.
    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record delivery results of one fan-out.
    pub fn events_fanned_out(&self, delivered: u64, dropped: u64) {
        self.events_delivered.fetch_add(delivered, Ordering::Relaxed);
        self.events_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Record an `error` event.
    pub fn error_reported(&self) {
        self.errors_reported.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a persisted message.
    pub fn message_persisted(&self) {
        self.messages_persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_evicted: self.connections_evicted.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            errors_reported: self.errors_reported.load(Ordering::Relaxed),
            messages_persisted: self.messages_persisted.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections established
    pub connections_opened: u64,
    /// Total connections torn down
    pub connections_closed: u64,
    /// Connections currently registered
    pub connections_active: u64,
    /// Connections evicted by the per-identity cap
    pub connections_evicted: u64,
    /// Inbound events received
    pub events_received: u64,
    /// Frames enqueued to connections
    pub events_delivered: u64,
    /// Frames dropped on a full or closed queue
    pub events_dropped: u64,
    /// `error` events reported to clients
    pub errors_reported: u64,
    /// Direct messages persisted
    pub messages_persisted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_never_underflows() {
        let metrics = EngineMetrics::new();
        metrics.connection_closed();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_active, 1);
        assert_eq!(snap.connections_opened, 2);
        assert_eq!(snap.connections_closed, 2);
    }
}
