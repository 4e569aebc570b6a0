//! Presence tracker. Persists online/offline transitions and broadcasts them.
//!
//! Transitions for one identity run under that identity's lock. Persistence
//! is best-effort: a store failure is logged and the broadcast still goes out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chateo_core::Identity;
use chateo_database::ProfileStore;
use chateo_entity::PresenceStatus;

use crate::channel::registry::ChannelRegistry;
use crate::locks::IdentityLocks;
use crate::message::types::OutboundEvent;

/// Last presence published for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshot {
    /// Current status.
    pub status: PresenceStatus,
    /// Disconnect time; `None` while online.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Tracks presence state for all identities seen by this process.
#[derive(Debug)]
pub struct PresenceTracker {
    profiles: Arc<dyn ProfileStore>,
    registry: Arc<ChannelRegistry>,
    locks: IdentityLocks,
    /// Identity → last published presence
    snapshots: DashMap<Identity, PresenceSnapshot>,
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new(profiles: Arc<dyn ProfileStore>, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            profiles,
            registry,
            locks: IdentityLocks::new(),
            snapshots: DashMap::new(),
        }
    }

    /// Mark an identity online and tell everyone else.
    pub async fn mark_online(&self, identity: &Identity) -> PresenceSnapshot {
        let _guard = self.locks.lock(identity).await;
        let snapshot = PresenceSnapshot {
            status: PresenceStatus::Online,
            last_seen: None,
        };
        self.publish(identity, snapshot).await;
        info!(%identity, "User is online");
        snapshot
    }

    /// Mark an identity offline with `lastSeen = now` and tell everyone else.
    ///
    /// Returns `None` without doing anything if a connection for the
    /// identity has (re)joined since the caller saw zero remaining.
    pub async fn mark_offline(&self, identity: &Identity) -> Option<PresenceSnapshot> {
        let _guard = self.locks.lock(identity).await;
        if self.registry.is_connected(identity) {
            info!(%identity, "Skipping offline transition, identity reconnected");
            return None;
        }
        let snapshot = PresenceSnapshot {
            status: PresenceStatus::Offline,
            last_seen: Some(Utc::now()),
        };
        self.publish(identity, snapshot).await;
        info!(%identity, last_seen = ?snapshot.last_seen, "User is offline");
        Some(snapshot)
    }

    async fn publish(&self, identity: &Identity, snapshot: PresenceSnapshot) {
        if let Err(e) = self
            .profiles
            .set_presence(identity, snapshot.status, snapshot.last_seen)
            .await
        {
            warn!(%identity, status = %snapshot.status, error = %e, "Failed to persist presence");
        }

        self.snapshots.insert(identity.clone(), snapshot);

        let event = OutboundEvent::UserStatusChange {
            user_id: identity.clone(),
            status: snapshot.status,
            last_seen: snapshot.last_seen,
        };
        self.registry.publish_except(identity, &event);
    }

    /// Get the last presence this process published for an identity
    pub fn status(&self, identity: &Identity) -> Option<PresenceSnapshot> {
        self.snapshots.get(identity).map(|r| *r.value())
    }

    /// Check if an identity is online
    pub fn is_online(&self, identity: &Identity) -> bool {
        self.status(identity)
            .is_some_and(|s| s.status.is_online())
    }

    /// Get online identity count
    pub fn online_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|r| r.value().status.is_online())
            .count()
    }
}
