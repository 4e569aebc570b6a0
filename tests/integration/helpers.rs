//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chateo_api::{AppState, build_router};
use chateo_auth::{JwtDecoder, JwtEncoder};
use chateo_core::Identity;
use chateo_core::config::{AppConfig, StoreProvider};
use chateo_database::{MemoryStore, Stores};

/// Client side of a test WebSocket connection.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TEST_SECRET: &str = "integration-test-secret";
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Test application context
pub struct TestApp {
    /// The Axum router for making in-process requests
    pub router: Router,
    /// Direct handle on the backing store
    pub store: MemoryStore,
    /// Shared state the router was built from
    pub state: AppState,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Build an application over an in-memory store holding `identities`.
    pub fn new(identities: &[&str]) -> Self {
        let mut config = AppConfig::default();
        config.store.provider = StoreProvider::Memory;
        config.auth.jwt_secret = TEST_SECRET.to_string();
        config.realtime.ping_interval_seconds = 30;

        let store = MemoryStore::with_identities(identities.iter().copied());
        let verifier = Arc::new(JwtDecoder::new(&config.auth));
        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, Stores::memory(store.clone()), verifier);
        let router = build_router(state.clone());

        Self {
            router,
            store,
            state,
            encoder,
        }
    }

    /// Mint a valid token for `identity`.
    pub fn token(&self, identity: &str) -> String {
        self.encoder
            .mint(&Identity::from(identity))
            .expect("Failed to mint token")
    }

    /// Serve the router on an ephemeral local port.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        addr
    }

    /// Open an authenticated WebSocket as `identity`.
    pub async fn connect(&self, addr: SocketAddr, identity: &str) -> WsClient {
        let url = format!("ws://{addr}/ws?token={}", self.token(identity));
        let (client, _) = connect_async(url)
            .await
            .expect("WebSocket handshake failed");
        self.wait_registered(identity).await;
        client
    }

    /// Wait until the server has registered a connection for `identity`.
    pub async fn wait_registered(&self, identity: &str) {
        let identity = Identity::from(identity);
        let registry = self.state.realtime.registry.clone();
        let wait = async {
            while !registry.is_connected(&identity) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(EVENT_TIMEOUT, wait)
            .await
            .expect("Connection was never registered");
    }
}

/// Send a JSON event frame.
pub async fn send_event(client: &mut WsClient, event: Value) {
    client
        .send(Message::text(event.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Read frames until one carries the event `name`, skipping all others.
pub async fn expect_event(client: &mut WsClient, name: &str) -> Value {
    let wait = async {
        while let Some(frame) = client.next().await {
            let frame = frame.expect("WebSocket read failed");
            if let Message::Text(text) = frame {
                let event: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
                if event["event"] == name {
                    return event;
                }
            }
        }
        panic!("Connection closed before '{name}' arrived");
    };
    tokio::time::timeout(EVENT_TIMEOUT, wait)
        .await
        .unwrap_or_else(|_| panic!("Timed out waiting for '{name}'"))
}

/// Read frames until a status change for `user` with `status` arrives.
pub async fn expect_status(client: &mut WsClient, user: &str, status: &str) -> Value {
    loop {
        let event = expect_event(client, "userStatusChange").await;
        if event["data"]["userId"] == user && event["data"]["status"] == status {
            return event;
        }
    }
}
