//! Integration tests for the WebSocket protocol over a live server.

mod helpers;

use futures::SinkExt;
use http::StatusCode;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;

use chateo_core::Identity;
use chateo_database::ProfileStore;
use chateo_entity::PresenceStatus;

use helpers::{TestApp, expect_event, expect_status, send_event};

#[tokio::test]
async fn test_friend_request_and_message_flow() {
    let app = TestApp::new(&["alice", "bob"]);
    let addr = app.spawn().await;

    let mut alice = app.connect(addr, "alice").await;
    let mut bob = app.connect(addr, "bob").await;

    // Alice learns that Bob came online.
    let online = expect_status(&mut alice, "bob", "online").await;
    assert!(online["data"]["lastSeen"].is_null());

    send_event(
        &mut alice,
        json!({ "event": "sendFriendRequest", "data": { "receiverId": "bob" } }),
    )
    .await;
    let received = expect_event(&mut bob, "friendRequestReceived").await;
    assert_eq!(received["data"]["senderId"], "alice");
    let sent = expect_event(&mut alice, "friendRequestSent").await;
    assert_eq!(sent["data"]["receiverId"], "bob");

    send_event(
        &mut bob,
        json!({ "event": "approveFriendRequest", "data": { "senderId": "alice" } }),
    )
    .await;
    let approved_bob = expect_event(&mut bob, "friendRequestApproved").await;
    assert_eq!(approved_bob["data"]["senderId"], "alice");
    let approved_alice = expect_event(&mut alice, "friendRequestApproved").await;
    assert_eq!(approved_alice["data"]["receiverId"], "bob");

    let alice_profile = app
        .store
        .find_profile(&Identity::from("alice"))
        .await
        .unwrap()
        .unwrap();
    let bob_profile = app
        .store
        .find_profile(&Identity::from("bob"))
        .await
        .unwrap()
        .unwrap();
    assert!(alice_profile.is_friend(&Identity::from("bob")));
    assert!(bob_profile.is_friend(&Identity::from("alice")));
    assert!(alice_profile.friend_requests_sent.is_empty());
    assert!(bob_profile.friend_requests_received.is_empty());

    send_event(
        &mut alice,
        json!({ "event": "message", "data": { "receiverId": "bob", "text": "hi bob" } }),
    )
    .await;
    let delivered = expect_event(&mut bob, "message").await;
    assert_eq!(delivered["data"]["senderId"], "alice");
    assert_eq!(delivered["data"]["receiverId"], "bob");
    assert_eq!(delivered["data"]["text"], "hi bob");
    assert_eq!(delivered["data"]["status"], "sent");
    let echoed = expect_event(&mut alice, "message").await;
    assert_eq!(echoed["data"]["text"], "hi bob");
    assert_eq!(app.store.message_count().await, 1);

    bob.close(None).await.unwrap();
    let offline = expect_status(&mut alice, "bob", "offline").await;
    assert!(offline["data"]["lastSeen"].is_string());

    let bob_profile = app
        .store
        .find_profile(&Identity::from("bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bob_profile.status, PresenceStatus::Offline);
    assert!(bob_profile.last_seen.is_some());
}

#[tokio::test]
async fn test_handshake_without_token_is_rejected() {
    let app = TestApp::new(&["alice"]);
    let addr = app.spawn().await;

    let err = connect_async(format!("ws://{addr}/ws")).await.unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        other => panic!("Expected HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_with_invalid_token_is_rejected() {
    let app = TestApp::new(&["alice"]);
    let addr = app.spawn().await;

    let err = connect_async(format!("ws://{addr}/ws?token=not-a-jwt"))
        .await
        .unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        other => panic!("Expected HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_frame_reports_error_and_keeps_connection() {
    let app = TestApp::new(&["alice", "bob"]);
    let addr = app.spawn().await;
    let mut alice = app.connect(addr, "alice").await;

    alice
        .send(tokio_tungstenite::tungstenite::Message::text("{ nope"))
        .await
        .unwrap();
    let error = expect_event(&mut alice, "error").await;
    assert!(error["data"]["message"].is_string());

    // The connection still processes events afterwards.
    send_event(
        &mut alice,
        json!({ "event": "message", "data": { "receiverId": "bob", "text": "still here" } }),
    )
    .await;
    let echoed = expect_event(&mut alice, "message").await;
    assert_eq!(echoed["data"]["text"], "still here");
}

#[tokio::test]
async fn test_message_to_unknown_user_is_an_error_event() {
    let app = TestApp::new(&["alice"]);
    let addr = app.spawn().await;
    let mut alice = app.connect(addr, "alice").await;

    send_event(
        &mut alice,
        json!({ "event": "message", "data": { "receiverId": "ghost", "text": "hello?" } }),
    )
    .await;
    expect_event(&mut alice, "error").await;
    assert_eq!(app.store.message_count().await, 0);
}

#[tokio::test]
async fn test_bare_identity_payloads_and_decline() {
    let app = TestApp::new(&["alice", "bob"]);
    let addr = app.spawn().await;
    let mut alice = app.connect(addr, "alice").await;
    let mut bob = app.connect(addr, "bob").await;

    send_event(&mut alice, json!({ "event": "sendFriendRequest", "data": "bob" })).await;
    let received = expect_event(&mut bob, "friendRequestReceived").await;
    assert_eq!(received["data"]["senderId"], "alice");
    expect_event(&mut alice, "friendRequestSent").await;

    // Bob declines the request he received.
    send_event(&mut bob, json!({ "event": "cancelFriendRequest", "data": "alice" })).await;
    let to_bob = expect_event(&mut bob, "friendRequestCanceled").await;
    assert_eq!(to_bob["data"]["receiverId"], "alice");
    let to_alice = expect_event(&mut alice, "friendRequestCanceled").await;
    assert_eq!(to_alice["data"]["senderId"], "bob");

    for who in ["alice", "bob"] {
        let profile = app
            .store
            .find_profile(&Identity::from(who))
            .await
            .unwrap()
            .unwrap();
        assert!(profile.friend_requests_sent.is_empty(), "{who}");
        assert!(profile.friend_requests_received.is_empty(), "{who}");
    }
}

#[tokio::test]
async fn test_handshake_for_unregistered_identity_is_rejected() {
    let app = TestApp::new(&["alice"]);
    let addr = app.spawn().await;

    let url = format!("ws://{addr}/ws?token={}", app.token("ghost"));
    let err = connect_async(url).await.unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        other => panic!("Expected HTTP rejection, got {other:?}"),
    }
    assert_eq!(app.state.realtime.registry.connection_count(), 0);
}
