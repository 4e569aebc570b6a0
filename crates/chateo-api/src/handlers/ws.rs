//! WebSocket upgrade handler.
//!
//! Authentication happens before the upgrade: a missing or invalid token is
//! answered with 401 and nothing is registered. After the upgrade, a writer
//! task drains the connection queue and pings; the reader loop feeds frames
//! to the engine one at a time.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use chateo_core::{AppError, Identity};
use chateo_realtime::ConnectionHandle;

use crate::dto::request::WsQuery;
use crate::extractors::bearer_token;
use crate::state::AppState;

/// GET /ws?token={jwt}: WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let token = query.token.as_deref().or_else(|| bearer_token(&headers));
    let identity = state.realtime.authenticate(token).await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_socket(state: AppState, identity: Identity, socket: WebSocket) {
    let engine = state.realtime.clone();
    let (handle, mut outbound_rx) = engine.connect(identity).await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let ping_interval = Duration::from_secs(engine.config().ping_interval_seconds.max(1));
    let pong_window = ping_interval + Duration::from_secs(engine.config().ping_timeout_seconds);

    let writer_handle: Arc<ConnectionHandle> = handle.clone();
    let writer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if writer_handle.pong_overdue(pong_window) {
                        warn!(conn_id = %writer_handle.id, "Heartbeat timeout, closing connection");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
                _ = writer_handle.closed() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        writer_handle.close();
        debug!(conn_id = %writer_handle.id, "Writer task ended");
    });

    loop {
        tokio::select! {
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    engine.handle_inbound(&handle, text.as_str()).await;
                }
                Some(Ok(Message::Pong(_))) => handle.record_pong(),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = handle.closed() => break,
        }
    }

    engine.disconnect(&handle).await;

    let abort = writer.abort_handle();
    if tokio::time::timeout(Duration::from_secs(1), writer).await.is_err() {
        abort.abort();
    }

    info!(
        conn_id = %handle.id,
        identity = %handle.identity,
        connected_secs = (Utc::now() - handle.connected_at).num_seconds(),
        "WebSocket connection closed"
    );
}
