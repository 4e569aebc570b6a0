//! Inbound and outbound WebSocket event definitions.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chateo_core::{AppError, AppResult, Identity};
use chateo_entity::{DeliveryStatus, Message, PresenceStatus};

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum InboundEvent {
    /// Send a direct message.
    Message {
        /// Recipient.
        receiver_id: Identity,
        /// Message body.
        text: String,
    },
    /// Ask the receiver to become friends.
    SendFriendRequest(ReceiverRef),
    /// Accept the pending request from the sender.
    ApproveFriendRequest(SenderRef),
    /// Clear the pending request with the counterparty, in either direction.
    CancelFriendRequest(ReceiverRef),
}

/// Friend-request target, sent either as a bare identity or as
/// `{"receiverId": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReceiverRef {
    /// `"bob"`
    Bare(Identity),
    /// `{"receiverId": "bob"}`
    Keyed {
        /// Request target.
        #[serde(rename = "receiverId")]
        receiver_id: Identity,
    },
}

impl ReceiverRef {
    /// The referenced identity.
    pub fn into_identity(self) -> Identity {
        match self {
            Self::Bare(identity) | Self::Keyed { receiver_id: identity } => identity,
        }
    }
}

/// Original requester, sent either as a bare identity or as
/// `{"senderId": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenderRef {
    /// `"alice"`
    Bare(Identity),
    /// `{"senderId": "alice"}`
    Keyed {
        /// Original requester.
        #[serde(rename = "senderId")]
        sender_id: Identity,
    },
}

impl SenderRef {
    /// The referenced identity.
    pub fn into_identity(self) -> Identity {
        match self {
            Self::Bare(identity) | Self::Keyed { sender_id: identity } => identity,
        }
    }
}

impl InboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::SendFriendRequest(_) => "sendFriendRequest",
            Self::ApproveFriendRequest(_) => "approveFriendRequest",
            Self::CancelFriendRequest(_) => "cancelFriendRequest",
        }
    }
}

/// The other side of a friend-request transition, keyed by its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Counterparty {
    /// `{"senderId": ...}`
    SenderId(Identity),
    /// `{"receiverId": ...}`
    ReceiverId(Identity),
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum OutboundEvent {
    /// A persisted direct message, sent to both parties.
    Message {
        /// Author.
        sender_id: Identity,
        /// Recipient.
        receiver_id: Identity,
        /// Message body.
        text: String,
        /// Delivery status.
        status: DeliveryStatus,
    },
    /// Presence change of another identity.
    UserStatusChange {
        /// Whose presence changed.
        user_id: Identity,
        /// New status.
        status: PresenceStatus,
        /// Disconnect time, `null` while online.
        last_seen: Option<DateTime<Utc>>,
    },
    /// Someone sent you a friend request.
    FriendRequestReceived {
        /// Requester.
        sender_id: Identity,
    },
    /// Your friend request was recorded.
    FriendRequestSent {
        /// Request target.
        receiver_id: Identity,
    },
    /// A pending request was approved.
    FriendRequestApproved(Counterparty),
    /// A pending request was withdrawn.
    FriendRequestCanceled(Counterparty),
    /// A handler failed; sent to the originating connection only.
    Error {
        /// `ErrorKind` tag, e.g. `VALIDATION`.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

impl OutboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::UserStatusChange { .. } => "userStatusChange",
            Self::FriendRequestReceived { .. } => "friendRequestReceived",
            Self::FriendRequestSent { .. } => "friendRequestSent",
            Self::FriendRequestApproved(_) => "friendRequestApproved",
            Self::FriendRequestCanceled(_) => "friendRequestCanceled",
            Self::Error { .. } => "error",
        }
    }

    /// Build the `message` event for a persisted message.
    pub fn message(message: &Message) -> Self {
        Self::Message {
            sender_id: message.sender.clone(),
            receiver_id: message.receiver.clone(),
            text: message.text.clone(),
            status: message.status,
        }
    }

    /// Build the `error` event for a failed handler.
    pub fn error(err: &AppError) -> Self {
        Self::Error {
            code: err.kind.to_string(),
            message: err.message.clone(),
        }
    }

    /// Serialize to a text frame.
    pub fn to_frame(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
