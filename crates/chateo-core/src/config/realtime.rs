//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound queue capacity per connection.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Maximum live connections per identity (0 = unlimited).
    #[serde(default)]
    pub max_connections_per_user: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without a pong before a connection is closed.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Maximum direct message length in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_buffer_size: default_connection_buffer(),
            max_connections_per_user: 0,
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_connection_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    25
}

fn default_ping_timeout() -> u64 {
    20
}

fn default_max_message_length() -> usize {
    4096
}
