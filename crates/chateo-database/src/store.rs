//! The Store contract used by the real-time core.
//!
//! Every relationship-set mutation is a single-document atomic primitive
//! (add-if-absent, conditional remove, move). Callers never read a set,
//! edit it locally, and write it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use chateo_core::{AppResult, Identity};
use chateo_entity::{Message, PresenceStatus, Profile, RelationSet};

/// Profile persistence.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a profile by identity.
    async fn find_profile(&self, identity: &Identity) -> AppResult<Option<Profile>>;

    /// Persist presence status and last-seen time.
    ///
    /// Fails with `NotFound` if the profile does not exist.
    async fn set_presence(
        &self,
        identity: &Identity,
        status: PresenceStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Add `member` to a set if absent. Returns `true` if it was added.
    ///
    /// Fails with `NotFound` if the profile does not exist.
    async fn add_to_set(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
    ) -> AppResult<bool>;

    /// Remove `member` from a set. Returns `true` if it was present.
    ///
    /// A missing profile is treated as an empty set.
    async fn remove_from_set(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
    ) -> AppResult<bool>;

    /// Atomically pull `member` from `from` and add it to `to` if absent.
    ///
    /// Fails with `NotFound` if the profile does not exist.
    async fn move_between_sets(
        &self,
        identity: &Identity,
        from: RelationSet,
        to: RelationSet,
        member: &Identity,
    ) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new message.
    async fn insert_message(&self, message: &Message) -> AppResult<()>;

    /// The most recent `limit` messages between `a` and `b`, oldest first.
    async fn conversation(
        &self,
        a: &Identity,
        b: &Identity,
        limit: usize,
    ) -> AppResult<Vec<Message>>;
}
