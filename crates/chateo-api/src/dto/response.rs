//! Response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chateo_core::Identity;
use chateo_entity::{Message, PresenceStatus};
use chateo_realtime::metrics::MetricsSnapshot;

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the process answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `GET /api/health/detailed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected` or `unavailable`.
    pub store: String,
    /// Registered WebSocket connections.
    pub ws_connections: usize,
    /// Identities with at least one connection.
    pub connected_users: usize,
    /// Identities this process last published as online.
    pub online_users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}

/// `GET /api/users/{identity}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    /// Whose status this is.
    pub user_id: Identity,
    /// Persisted presence.
    pub status: PresenceStatus,
    /// Last disconnect time; `null` while online.
    pub last_seen: Option<DateTime<Utc>>,
}

/// `GET /api/messages/{peer}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    /// The other party.
    pub peer_id: Identity,
    /// Messages, oldest first.
    pub messages: Vec<Message>,
}
