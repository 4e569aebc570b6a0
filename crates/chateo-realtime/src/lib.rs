//! # chateo-realtime
//!
//! Real-time engine for Chateo. Provides:
//!
//! - Per-identity delivery channels with multiple live connections
//! - Presence tracking with last-seen bookkeeping
//! - The friend-request state machine over atomic store primitives
//! - Persist-then-deliver direct messaging
//! - A session orchestrator that routes inbound events and reports errors
//!   to the originating connection only

pub mod channel;
pub mod chat;
pub mod connection;
pub mod friendship;
pub mod locks;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod server;

pub use channel::registry::ChannelRegistry;
pub use chat::pipeline::MessagePipeline;
pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use friendship::coordinator::FriendshipCoordinator;
pub use friendship::error::FriendRequestError;
pub use message::types::{Counterparty, InboundEvent, OutboundEvent, ReceiverRef, SenderRef};
pub use presence::tracker::{PresenceSnapshot, PresenceTracker};
pub use server::RealtimeEngine;
