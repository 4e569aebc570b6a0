//! Profile entity, the per-identity document the real-time core mutates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chateo_core::Identity;

use crate::presence::PresenceStatus;

/// Default avatar path assigned at registration.
pub const DEFAULT_PROFILE_IMAGE: &str = "default.png";

/// The three relationship sets stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationSet {
    /// Identities this profile has sent a pending request to.
    FriendRequestsSent,
    /// Identities that have sent this profile a pending request.
    FriendRequestsReceived,
    /// Mutual friends.
    Friends,
}

impl RelationSet {
    /// Storage column name for this set.
    pub fn column(&self) -> &'static str {
        match self {
            Self::FriendRequestsSent => "friend_requests_sent",
            Self::FriendRequestsReceived => "friend_requests_received",
            Self::Friends => "friends",
        }
    }
}

/// A registered user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identity (primary key).
    #[serde(rename = "userId")]
    pub identity: Identity,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Avatar path.
    pub profile_image: String,
    /// Outstanding requests this profile sent.
    pub friend_requests_sent: BTreeSet<Identity>,
    /// Outstanding requests this profile received.
    pub friend_requests_received: BTreeSet<Identity>,
    /// Mutual friends.
    pub friends: BTreeSet<Identity>,
    /// Current presence status.
    pub status: PresenceStatus,
    /// Last disconnect time; `None` while online.
    pub last_seen: Option<DateTime<Utc>>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a fresh, offline profile with empty relationship sets.
    pub fn new(identity: Identity, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            identity,
            first_name: first_name.into(),
            last_name: last_name.into(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            friend_requests_sent: BTreeSet::new(),
            friend_requests_received: BTreeSet::new(),
            friends: BTreeSet::new(),
            status: PresenceStatus::Offline,
            last_seen: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mutably borrow one of the relationship sets.
    pub fn set_mut(&mut self, set: RelationSet) -> &mut BTreeSet<Identity> {
        match set {
            RelationSet::FriendRequestsSent => &mut self.friend_requests_sent,
            RelationSet::FriendRequestsReceived => &mut self.friend_requests_received,
            RelationSet::Friends => &mut self.friends,
        }
    }

    /// Whether `other` already has a pending request to, or is friends with, this profile.
    pub fn has_request_or_friendship_from(&self, other: &Identity) -> bool {
        self.friend_requests_received.contains(other) || self.is_friend(other)
    }

    /// Whether `other` is a mutual friend.
    pub fn is_friend(&self, other: &Identity) -> bool {
        self.friends.contains(other)
    }
}
