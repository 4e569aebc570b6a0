//! Channel registry mapping each identity to its live connections.
//!
//! Delivery never awaits: it snapshots the room under the map's shard lock
//! and `try_send`s into each connection's FIFO queue, so events to one
//! identity keep `deliver` call order.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, error, warn};

use chateo_core::Identity;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::OutboundEvent;
use crate::metrics::EngineMetrics;

/// Registry of identity rooms.
#[derive(Debug)]
pub struct ChannelRegistry {
    /// Identity → live connections, oldest first.
    rooms: DashMap<Identity, Vec<Arc<ConnectionHandle>>>,
    /// Connection cap per identity (0 = unlimited).
    max_per_identity: usize,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new(max_per_identity: usize, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            rooms: DashMap::new(),
            max_per_identity,
            metrics,
        }
    }

    /// Registers a connection in its identity's room.
    ///
    /// Joining the same handle twice is a no-op. When the room is at the
    /// cap, the oldest connections are closed and returned.
    pub fn join(&self, handle: Arc<ConnectionHandle>) -> Vec<Arc<ConnectionHandle>> {
        let mut room = self.rooms.entry(handle.identity.clone()).or_default();
        if room.iter().any(|c| c.id == handle.id) {
            return Vec::new();
        }

        let mut evicted = Vec::new();
        if self.max_per_identity > 0 {
            while room.len() >= self.max_per_identity {
                let oldest = room.remove(0);
                warn!(
                    identity = %handle.identity,
                    conn_id = %oldest.id,
                    max = self.max_per_identity,
                    "Identity at max connections, closing oldest"
                );
                oldest.close();
                self.metrics.connection_evicted();
                evicted.push(oldest);
            }
        }

        room.push(handle.clone());
        debug!(identity = %handle.identity, conn_id = %handle.id, count = room.len(), "Joined room");
        evicted
    }

    /// Removes one connection. Returns how many remain for the identity.
    pub fn leave(&self, identity: &Identity, conn_id: ConnectionId) -> usize {
        let remaining = match self.rooms.get_mut(identity) {
            Some(mut room) => {
                room.retain(|c| c.id != conn_id);
                room.len()
            }
            None => return 0,
        };
        if remaining == 0 {
            self.rooms.remove_if(identity, |_, room| room.is_empty());
        }
        debug!(%identity, %conn_id, remaining, "Left room");
        remaining
    }

    /// Fans an event out to every live connection of `identity`.
    ///
    /// No-op for an identity with no connections. Returns the number of
    /// connections the frame was enqueued to.
    pub fn deliver(&self, identity: &Identity, event: &OutboundEvent) -> usize {
        let Some(frame) = Self::encode(event) else {
            return 0;
        };
        self.deliver_frame(identity, &frame)
    }

    /// Fans a pre-serialized frame out to every connection of `identity`.
    pub fn deliver_frame(&self, identity: &Identity, frame: &str) -> usize {
        let Some(room) = self.rooms.get(identity) else {
            return 0;
        };
        let (mut delivered, mut dropped) = (0u64, 0u64);
        for conn in room.iter() {
            if conn.send(frame.to_owned()) {
                delivered += 1;
            } else {
                dropped += 1;
            }
        }
        drop(room);
        self.metrics.events_fanned_out(delivered, dropped);
        delivered as usize
    }

    /// Delivers to every connected identity except `excluded`.
    pub fn publish_except(&self, excluded: &Identity, event: &OutboundEvent) -> usize {
        let Some(frame) = Self::encode(event) else {
            return 0;
        };
        self.connected_identities()
            .iter()
            .filter(|identity| *identity != excluded)
            .map(|identity| self.deliver_frame(identity, &frame))
            .sum()
    }

    /// Snapshot of identities with at least one connection.
    pub fn connected_identities(&self) -> Vec<Identity> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether `identity` has at least one connection.
    pub fn is_connected(&self, identity: &Identity) -> bool {
        self.rooms
            .get(identity)
            .is_some_and(|room| !room.is_empty())
    }

    /// Returns total number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.rooms.iter().map(|entry| entry.value().len()).sum()
    }

    /// Returns number of connected identities.
    pub fn identity_count(&self) -> usize {
        self.rooms.len()
    }

    /// Removes and returns every connection.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let identities = self.connected_identities();
        identities
            .iter()
            .filter_map(|identity| self.rooms.remove(identity))
            .flat_map(|(_, room)| room)
            .collect()
    }

    fn encode(event: &OutboundEvent) -> Option<String> {
        match event.to_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!(event = event.name(), error = %e, "Failed to serialize outbound event");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn registry(max: usize) -> ChannelRegistry {
        ChannelRegistry::new(max, Arc::new(EngineMetrics::new()))
    }

    fn conn(identity: &str) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (handle, rx) = ConnectionHandle::new(Identity::from(identity), 8);
        (Arc::new(handle), rx)
    }

    fn ping_event() -> OutboundEvent {
        OutboundEvent::FriendRequestSent {
            receiver_id: Identity::from("x"),
        }
    }

    #[test]
    fn test_join_is_idempotent_and_leave_counts() {
        let registry = registry(0);
        let (a1, _rx1) = conn("alice");
        let (a2, _rx2) = conn("alice");

        registry.join(a1.clone());
        registry.join(a1.clone());
        registry.join(a2.clone());
        assert_eq!(registry.connection_count(), 2);

        assert_eq!(registry.leave(&a1.identity, a1.id), 1);
        assert_eq!(registry.leave(&a2.identity, a2.id), 0);
        assert!(!registry.is_connected(&Identity::from("alice")));
        assert_eq!(registry.identity_count(), 0);
    }

    #[test]
    fn test_deliver_fans_out_in_order() {
        let registry = registry(0);
        let (a1, mut rx1) = conn("alice");
        let (a2, mut rx2) = conn("alice");
        registry.join(a1);
        registry.join(a2);

        let first = OutboundEvent::FriendRequestReceived {
            sender_id: Identity::from("bob"),
        };
        assert_eq!(registry.deliver(&Identity::from("alice"), &first), 2);
        assert_eq!(registry.deliver(&Identity::from("alice"), &ping_event()), 2);

        for rx in [&mut rx1, &mut rx2] {
            assert!(rx.try_recv().unwrap().contains("friendRequestReceived"));
            assert!(rx.try_recv().unwrap().contains("friendRequestSent"));
        }
    }

    #[test]
    fn test_deliver_to_absent_identity_is_noop() {
        let registry = registry(0);
        assert_eq!(registry.deliver(&Identity::from("ghost"), &ping_event()), 0);
    }

    #[test]
    fn test_publish_except_skips_excluded() {
        let registry = registry(0);
        let (alice, mut alice_rx) = conn("alice");
        let (bob, mut bob_rx) = conn("bob");
        registry.join(alice.clone());
        registry.join(bob);

        assert_eq!(registry.publish_except(&alice.identity, &ping_event()), 1);
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_ok());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let registry = registry(1);
        let (first, _rx1) = conn("alice");
        let (second, _rx2) = conn("alice");

        registry.join(first.clone());
        let evicted = registry.join(second.clone());

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, first.id);
        assert!(!first.is_alive());
        assert_eq!(registry.connection_count(), 1);
        // The evicted connection is gone; leaving reports the survivor.
        assert_eq!(registry.leave(&first.identity, first.id), 1);
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = registry(0);
        let (a, _rx) = conn("alice");
        let (b, _rx2) = conn("bob");
        registry.join(a);
        registry.join(b);
        assert_eq!(registry.drain().len(), 2);
        assert_eq!(registry.connection_count(), 0);
    }
}
