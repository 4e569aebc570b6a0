//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chateo_auth::IdentityVerifier;
use chateo_core::config::AppConfig;
use chateo_database::{MessageStore, ProfileStore, Stores};
use chateo_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Profile store
    pub profiles: Arc<dyn ProfileStore>,
    /// Message store
    pub messages: Arc<dyn MessageStore>,
    /// Token verifier for HTTP routes
    pub verifier: Arc<dyn IdentityVerifier>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Wire the real-time engine over the given stores.
    pub fn new(config: AppConfig, stores: Stores, verifier: Arc<dyn IdentityVerifier>) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            stores.profiles.clone(),
            stores.messages.clone(),
            verifier.clone(),
        ));
        Self {
            config: Arc::new(config),
            profiles: stores.profiles,
            messages: stores.messages,
            verifier,
            realtime,
        }
    }
}
