//! Integration tests for the HTTP query endpoints.

mod helpers;

use axum::body::{Body, to_bytes};
use chrono::{Duration, Utc};
use http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use chateo_core::Identity;
use chateo_database::{MessageStore, ProfileStore};
use chateo_entity::{Message, PresenceStatus};

use helpers::TestApp;

async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn seed_conversation(app: &TestApp, count: i64) {
    let base = Utc::now();
    for i in 0..count {
        let (from, to) = if i % 2 == 0 { ("alice", "bob") } else { ("bob", "alice") };
        let message = Message::new(
            Identity::from(from),
            Identity::from(to),
            format!("m{i}"),
            base + Duration::milliseconds(i),
        );
        app.store.insert_message(&message).await.unwrap();
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(&["alice"]);
    let (status, body) = get(&app, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = TestApp::new(&["alice"]);
    let (status, body) = get(&app, "/api/health/detailed", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "connected");
    assert_eq!(body["ws_connections"], 0);
    assert_eq!(body["online_users"], 0);
    assert!(body["metrics"].is_object());
}

#[tokio::test]
async fn test_status_of_unknown_user_is_not_found() {
    let app = TestApp::new(&["alice"]);
    let (status, _) = get(&app, "/api/users/ghost/status", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_reflects_persisted_presence() {
    let app = TestApp::new(&["alice"]);
    let (status, body) = get(&app, "/api/users/alice/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "alice");
    assert_eq!(body["status"], "offline");

    let seen = Utc::now();
    app.store
        .set_presence(&Identity::from("alice"), PresenceStatus::Offline, Some(seen))
        .await
        .unwrap();
    let (_, body) = get(&app, "/api/users/alice/status", None).await;
    assert!(body["lastSeen"].is_string());

    app.store
        .set_presence(&Identity::from("alice"), PresenceStatus::Online, None)
        .await
        .unwrap();
    let (_, body) = get(&app, "/api/users/alice/status", None).await;
    assert_eq!(body["status"], "online");
    assert!(body["lastSeen"].is_null());
}

#[tokio::test]
async fn test_conversation_requires_token() {
    let app = TestApp::new(&["alice", "bob"]);
    let (status, body) = get(&app, "/api/messages/bob", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTHENTICATION");

    let (status, _) = get(&app, "/api/messages/bob", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_conversation_returns_latest_messages_oldest_first() {
    let app = TestApp::new(&["alice", "bob"]);
    seed_conversation(&app, 4).await;
    let token = app.token("alice");

    let (status, body) = get(&app, "/api/messages/bob", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peerId"], "bob");
    let texts: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["m0", "m1", "m2", "m3"]);

    let (status, body) = get(&app, "/api/messages/bob?limit=2", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["m2", "m3"]);
}

#[tokio::test]
async fn test_conversation_rejects_zero_limit() {
    let app = TestApp::new(&["alice", "bob"]);
    let token = app.token("alice");

    let (status, _) = get(&app, "/api/messages/bob?limit=0", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ws_route_without_token_is_unauthorized() {
    let app = TestApp::new(&["alice"]);
    let (status, _) = get(&app, "/ws", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
