//! Session orchestrator: the top-level real-time engine.
//!
//! Wires a verified connection into the registry and presence tracker,
//! routes inbound events to the coordinator or the message pipeline, and
//! tears everything down on disconnect. Handler failures become `error`
//! events for the originating connection only.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use chateo_auth::IdentityVerifier;
use chateo_core::config::RealtimeConfig;
use chateo_core::{AppError, AppResult, Identity};
use chateo_database::{MessageStore, ProfileStore};

use crate::channel::registry::ChannelRegistry;
use crate::chat::pipeline::MessagePipeline;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::handle::ConnectionHandle;
use crate::friendship::coordinator::FriendshipCoordinator;
use crate::message::types::{InboundEvent, OutboundEvent};
use crate::metrics::EngineMetrics;
use crate::presence::tracker::PresenceTracker;

/// Central real-time engine that coordinates all subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Channel registry.
    pub registry: Arc<ChannelRegistry>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Friend request coordinator.
    pub friendships: Arc<FriendshipCoordinator>,
    /// Message pipeline.
    pub chat: Arc<MessagePipeline>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    /// Handshake authenticator.
    authenticator: WsAuthenticator,
    /// Engine configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let authenticator = WsAuthenticator::new(verifier, profiles.clone());
        let metrics = Arc::new(EngineMetrics::new());
        let registry = Arc::new(ChannelRegistry::new(
            config.max_connections_per_user,
            metrics.clone(),
        ));
        let presence = Arc::new(PresenceTracker::new(profiles.clone(), registry.clone()));
        let friendships = Arc::new(FriendshipCoordinator::new(
            profiles.clone(),
            registry.clone(),
        ));
        let chat = Arc::new(MessagePipeline::new(
            profiles,
            messages,
            registry.clone(),
            metrics.clone(),
            config.max_message_length,
        ));

        info!("Real-time engine initialized");

        Self {
            registry,
            presence,
            friendships,
            chat,
            metrics,
            authenticator,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Verify a handshake token. Nothing is registered on failure.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<Identity> {
        self.authenticator.authenticate(token).await
    }

    /// Register a verified identity's new connection and mark it online.
    ///
    /// Returns the handle and the receiver the socket writer drains.
    pub async fn connect(
        &self,
        identity: Identity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (handle, rx) = ConnectionHandle::new(identity, self.config.connection_buffer_size);
        let handle = Arc::new(handle);

        let evicted = self.registry.join(handle.clone());
        self.metrics.connection_opened();
        if !evicted.is_empty() {
            debug!(identity = %handle.identity, count = evicted.len(), "Evicted older connections");
        }

        self.presence.mark_online(&handle.identity).await;

        info!(
            conn_id = %handle.id,
            identity = %handle.identity,
            "WebSocket connection registered"
        );
        (handle, rx)
    }

    /// Parse and route one inbound text frame.
    pub async fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) {
        self.metrics.event_received();

        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                self.report(
                    handle,
                    &AppError::validation(format!("Malformed event: {e}")),
                );
                return;
            }
        };

        let name = event.name();
        debug!(conn_id = %handle.id, identity = %handle.identity, event = name, "Inbound event");

        if let Err(err) = self.dispatch(&handle.identity, event).await {
            warn!(
                conn_id = %handle.id,
                identity = %handle.identity,
                event = name,
                error = %err,
                "Inbound event failed"
            );
            self.report(handle, &err);
        }
    }

    async fn dispatch(&self, identity: &Identity, event: InboundEvent) -> AppResult<()> {
        match event {
            InboundEvent::Message { receiver_id, text } => {
                self.chat.send(identity, &receiver_id, text).await?;
            }
            InboundEvent::SendFriendRequest(receiver) => {
                let receiver = receiver.into_identity();
                self.friendships.send_request(identity, &receiver).await?;
            }
            InboundEvent::ApproveFriendRequest(sender) => {
                let sender = sender.into_identity();
                self.friendships.approve_request(identity, &sender).await?;
            }
            InboundEvent::CancelFriendRequest(target) => {
                let target = target.into_identity();
                self.friendships.cancel_request(identity, &target).await?;
            }
        }
        Ok(())
    }

    fn report(&self, handle: &ConnectionHandle, err: &AppError) {
        self.metrics.error_reported();
        match OutboundEvent::error(err).to_frame() {
            Ok(frame) => {
                handle.send(frame);
            }
            Err(e) => warn!(conn_id = %handle.id, error = %e, "Failed to serialize error event"),
        }
    }

    /// Tear a connection down. Safe to call more than once.
    ///
    /// The identity goes offline only when no other connection remains.
    pub async fn disconnect(&self, handle: &ConnectionHandle) {
        if !handle.release() {
            return;
        }
        handle.close();
        self.metrics.connection_closed();

        let remaining = self.registry.leave(&handle.identity, handle.id);
        info!(
            conn_id = %handle.id,
            identity = %handle.identity,
            remaining,
            "WebSocket connection unregistered"
        );

        if remaining == 0 {
            self.presence.mark_offline(&handle.identity).await;
        }
    }

    /// Initiates a graceful shutdown: every connection is asked to close.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down real-time engine");

        let all = self.registry.drain();
        for conn in &all {
            conn.close();
        }

        info!(count = all.len(), "Real-time engine shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chateo_auth::{AuthError, JwtDecoder, JwtEncoder};
    use chateo_core::config::AuthConfig;
    use chateo_database::MemoryStore;
    use chateo_entity::PresenceStatus;

    use super::*;

    fn engine(store: Arc<MemoryStore>, config: RealtimeConfig) -> RealtimeEngine {
        let auth = AuthConfig {
            jwt_secret: "engine-test".into(),
            ..AuthConfig::default()
        };
        RealtimeEngine::new(
            config,
            store.clone(),
            store,
            Arc::new(JwtDecoder::new(&auth)),
        )
    }

    fn id(s: &str) -> Identity {
        Identity::from(s)
    }

    #[tokio::test]
    async fn test_authenticate() {
        let engine = engine(
            Arc::new(MemoryStore::with_identities(["alice"])),
            RealtimeConfig::default(),
        );
        let err = engine.authenticate(None).await.unwrap_err();
        assert_eq!(err.kind, chateo_core::error::ErrorKind::Authentication);
        assert_eq!(err.message, AuthError::Missing.to_string());

        let token = JwtEncoder::new(&AuthConfig {
            jwt_secret: "engine-test".into(),
            ..AuthConfig::default()
        })
        .mint(&id("alice"))
        .unwrap();
        assert_eq!(engine.authenticate(Some(&token)).await.unwrap(), id("alice"));
        assert_eq!(engine.registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_token_for_unregistered_identity_is_rejected() {
        let store = Arc::new(MemoryStore::with_identities(["alice"]));
        let engine = engine(store, RealtimeConfig::default());
        let token = JwtEncoder::new(&AuthConfig {
            jwt_secret: "engine-test".into(),
            ..AuthConfig::default()
        })
        .mint(&id("ghost"))
        .unwrap();

        let err = engine.authenticate(Some(&token)).await.unwrap_err();
        assert_eq!(err.kind, chateo_core::error::ErrorKind::Authentication);
        assert!(!engine.presence.is_online(&id("ghost")));
        assert_eq!(engine.registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_frame_reports_validation_error() {
        let store = Arc::new(MemoryStore::with_identities(["alice"]));
        let engine = engine(store, RealtimeConfig::default());
        let (handle, mut rx) = engine.connect(id("alice")).await;

        engine.handle_inbound(&handle, "{not json").await;

        let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["event"], "error");
        assert_eq!(frame["data"]["code"], "VALIDATION");
        assert_eq!(engine.metrics.snapshot().errors_reported, 1);
    }

    #[tokio::test]
    async fn test_errors_go_to_originating_connection_only() {
        let store = Arc::new(MemoryStore::with_identities(["alice", "bob"]));
        let engine = engine(store, RealtimeConfig::default());
        let (alice1, mut rx1) = engine.connect(id("alice")).await;
        let (_alice2, mut rx2) = engine.connect(id("alice")).await;

        engine
            .handle_inbound(
                &alice1,
                r#"{"event":"sendFriendRequest","data":{"receiverId":"alice"}}"#,
            )
            .await;

        let frame: serde_json::Value = serde_json::from_str(&rx1.recv().await.unwrap()).unwrap();
        assert_eq!(frame["event"], "error");
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_last_connection_goes_offline() {
        let store = Arc::new(MemoryStore::with_identities(["alice"]));
        let engine = engine(store.clone(), RealtimeConfig::default());

        let (first, _rx1) = engine.connect(id("alice")).await;
        let (second, _rx2) = engine.connect(id("alice")).await;
        assert!(engine.presence.is_online(&id("alice")));

        engine.disconnect(&first).await;
        assert!(engine.presence.is_online(&id("alice")));

        engine.disconnect(&second).await;
        engine.disconnect(&second).await;
        let profile = store.find_profile(&id("alice")).await.unwrap().unwrap();
        assert_eq!(profile.status, PresenceStatus::Offline);
        assert!(profile.last_seen.is_some());

        let snap = engine.metrics.snapshot();
        assert_eq!(snap.connections_opened, 2);
        assert_eq!(snap.connections_closed, 2);
        assert_eq!(snap.connections_active, 0);
    }

    #[tokio::test]
    async fn test_evicted_connection_does_not_go_offline() {
        let store = Arc::new(MemoryStore::with_identities(["alice"]));
        let config = RealtimeConfig {
            max_connections_per_user: 1,
            ..RealtimeConfig::default()
        };
        let engine = engine(store, config);

        let (old, _rx1) = engine.connect(id("alice")).await;
        let (_new, _rx2) = engine.connect(id("alice")).await;
        assert!(!old.is_alive());

        engine.disconnect(&old).await;
        assert!(engine.presence.is_online(&id("alice")));
        assert_eq!(engine.registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_everything() {
        let store = Arc::new(MemoryStore::with_identities(["alice", "bob"]));
        let engine = engine(store, RealtimeConfig::default());
        let (alice, _rx1) = engine.connect(id("alice")).await;
        let (bob, _rx2) = engine.connect(id("bob")).await;

        engine.shutdown().await.unwrap();

        assert!(!alice.is_alive());
        assert!(!bob.is_alive());
        assert_eq!(engine.registry.connection_count(), 0);
    }
}
