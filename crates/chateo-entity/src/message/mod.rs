//! Direct message entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chateo_core::Identity;

/// Delivery state of a message. A message is terminal once sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Persisted and handed to the delivery channels.
    #[default]
    Sent,
}

impl DeliveryStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
        }
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = chateo_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            _ => Err(chateo_core::AppError::validation(format!(
                "Invalid delivery status: '{s}'"
            ))),
        }
    }
}

/// An immutable direct message between two identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier (UUID v7, time ordered).
    pub id: Uuid,
    /// Author of the message.
    #[serde(rename = "senderId")]
    pub sender: Identity,
    /// Addressee of the message.
    #[serde(rename = "receiverId")]
    pub receiver: Identity,
    /// Message body.
    pub text: String,
    /// Creation time assigned by the message pipeline.
    pub timestamp: DateTime<Utc>,
    /// Delivery status.
    pub status: DeliveryStatus,
}

impl Message {
    /// Build a freshly sent message.
    pub fn new(sender: Identity, receiver: Identity, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            receiver,
            text,
            timestamp,
            status: DeliveryStatus::Sent,
        }
    }

    /// Whether the message belongs to the conversation between `a` and `b`.
    pub fn is_between(&self, a: &Identity, b: &Identity) -> bool {
        (&self.sender == a && &self.receiver == b) || (&self.sender == b && &self.receiver == a)
    }
}
