//! In-memory store implementation using `dashmap`.
//!
//! Each profile lives in its own map entry, so every primitive below runs
//! under that entry's lock and is atomic per document, the same guarantee
//! the PostgreSQL repositories give per row.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use tokio::sync::RwLock;
use tracing::debug;

use chateo_core::error::AppError;
use chateo_core::{AppResult, Identity};
use chateo_entity::{Message, PresenceStatus, Profile, RelationSet};

use crate::store::{MessageStore, ProfileStore};

/// Process-local store for profiles and messages.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: Arc<DashMap<Identity, Profile>>,
    messages: Arc<RwLock<Vec<Message>>>,
    /// Identities whose profile writes fail with a database error.
    failing: Arc<DashSet<Identity>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a bare profile for each identity.
    pub fn with_identities<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for id in identities {
            let identity = Identity::new(id);
            store.insert_profile(Profile::new(identity, "", ""));
        }
        store
    }

    /// Insert or replace a profile.
    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.identity.clone(), profile);
    }

    /// Make every profile write for `identity` fail until cleared.
    pub fn fail_writes_for(&self, identity: &Identity) {
        self.failing.insert(identity.clone());
    }

    /// Stop injecting write failures.
    pub fn clear_failures(&self) {
        self.failing.clear();
    }

    /// Number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Snapshot of all stored messages in insertion order.
    pub async fn all_messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    fn check_writable(&self, identity: &Identity) -> AppResult<()> {
        if self.failing.contains(identity) {
            return Err(AppError::database(format!(
                "Write to profile '{identity}' failed"
            )));
        }
        Ok(())
    }

    fn missing(identity: &Identity) -> AppError {
        AppError::not_found(format!("User '{identity}' not found"))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, identity: &Identity) -> AppResult<Option<Profile>> {
        Ok(self.profiles.get(identity).map(|p| p.value().clone()))
    }

    async fn set_presence(
        &self,
        identity: &Identity,
        status: PresenceStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        self.check_writable(identity)?;
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| Self::missing(identity))?;
        profile.status = status;
        profile.last_seen = last_seen;
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn add_to_set(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
    ) -> AppResult<bool> {
        self.check_writable(identity)?;
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| Self::missing(identity))?;
        let added = profile.set_mut(set).insert(member.clone());
        if added {
            profile.updated_at = Utc::now();
        }
        debug!(%identity, ?set, %member, added, "add_to_set");
        Ok(added)
    }

    async fn remove_from_set(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
    ) -> AppResult<bool> {
        self.check_writable(identity)?;
        let Some(mut profile) = self.profiles.get_mut(identity) else {
            return Ok(false);
        };
        let removed = profile.set_mut(set).remove(member);
        if removed {
            profile.updated_at = Utc::now();
        }
        debug!(%identity, ?set, %member, removed, "remove_from_set");
        Ok(removed)
    }

    async fn move_between_sets(
        &self,
        identity: &Identity,
        from: RelationSet,
        to: RelationSet,
        member: &Identity,
    ) -> AppResult<()> {
        self.check_writable(identity)?;
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| Self::missing(identity))?;
        profile.set_mut(from).remove(member);
        profile.set_mut(to).insert(member.clone());
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, message: &Message) -> AppResult<()> {
        self.check_writable(&message.sender)?;
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn conversation(
        &self,
        a: &Identity,
        b: &Identity,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut matching: Vec<Message> = messages
            .iter()
            .rev()
            .filter(|m| m.is_between(a, b))
            .take(limit)
            .cloned()
            .collect();
        matching.reverse();
        Ok(matching)
    }
}
