//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use chateo_core::Identity;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's FIFO outbound queue of
/// serialized frames, plus liveness bookkeeping for the socket task.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Identity that owns this connection
    pub identity: Identity,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound frames
    sender: mpsc::Sender<String>,
    /// Last pong received (ms since epoch)
    last_pong_ms: AtomicI64,
    /// Whether the connection is still alive
    alive: AtomicBool,
    /// Set once the orchestrator has torn the connection down
    released: AtomicBool,
    /// Close signal observed by the socket task
    close_tx: watch::Sender<bool>,
}

impl ConnectionHandle {
    /// Create a new handle and the receiver its socket task drains.
    pub fn new(identity: Identity, buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, rx) = mpsc::channel(buffer.max(1));
        let (close_tx, _) = watch::channel(false);
        let now = Utc::now();
        let handle = Self {
            id: Uuid::new_v4(),
            identity,
            connected_at: now,
            sender,
            last_pong_ms: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
            released: AtomicBool::new(false),
            close_tx,
        };
        (handle, rx)
    }

    /// Enqueue a frame without waiting.
    ///
    /// A full queue drops the frame; a closed queue marks the connection dead.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    conn_id = %self.id,
                    identity = %self.identity,
                    "Send buffer full, dropping frame"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark dead and ask the socket task to close the WebSocket.
    pub fn close(&self) {
        self.mark_dead();
        self.close_tx.send_replace(true);
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        let mut rx = self.close_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Claim teardown. Returns `true` for the first caller only.
    pub fn release(&self) -> bool {
        !self.released.swap(true, Ordering::SeqCst)
    }

    /// Record a pong response
    pub fn record_pong(&self) {
        self.last_pong_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    /// Whether no pong has arrived within `window`.
    pub fn pong_overdue(&self, window: Duration) -> bool {
        let elapsed = Utc::now().timestamp_millis() - self.last_pong_ms.load(Ordering::SeqCst);
        elapsed > window.as_millis() as i64
    }
}
