//! Friend request coordinator.
//!
//! States per ordered pair (A, B): none, A→B pending, mutual friends. Every
//! mutation is an atomic store primitive, and all operations on a pair are
//! serialized through the pair's identity locks.

use std::sync::Arc;

use tracing::{error, info};

use chateo_core::Identity;
use chateo_database::ProfileStore;
use chateo_entity::RelationSet;

use crate::channel::registry::ChannelRegistry;
use crate::locks::IdentityLocks;
use crate::message::types::{Counterparty, OutboundEvent};

use super::error::FriendRequestError;

/// Owns the friend-request state machine.
#[derive(Debug)]
pub struct FriendshipCoordinator {
    profiles: Arc<dyn ProfileStore>,
    registry: Arc<ChannelRegistry>,
    locks: IdentityLocks,
}

impl FriendshipCoordinator {
    /// Creates a new coordinator.
    pub fn new(profiles: Arc<dyn ProfileStore>, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            profiles,
            registry,
            locks: IdentityLocks::new(),
        }
    }

    /// Record a pending request from `sender` to `receiver`.
    pub async fn send_request(
        &self,
        sender: &Identity,
        receiver: &Identity,
    ) -> Result<(), FriendRequestError> {
        if sender == receiver {
            return Err(FriendRequestError::SelfRequest);
        }
        let _guard = self.locks.lock_pair(sender, receiver).await;

        let target = self
            .profiles
            .find_profile(receiver)
            .await?
            .ok_or_else(|| FriendRequestError::UnknownUser(receiver.clone()))?;
        if target.has_request_or_friendship_from(sender) {
            return Err(FriendRequestError::AlreadyRequestedOrFriends(
                receiver.clone(),
            ));
        }

        let added = self
            .profiles
            .add_to_set(receiver, RelationSet::FriendRequestsReceived, sender)
            .await?;
        if !added {
            return Err(FriendRequestError::AlreadyRequestedOrFriends(
                receiver.clone(),
            ));
        }

        if let Err(e) = self
            .profiles
            .add_to_set(sender, RelationSet::FriendRequestsSent, receiver)
            .await
        {
            self.compensate(
                receiver,
                RelationSet::FriendRequestsReceived,
                sender,
                "send_request",
            )
            .await;
            return Err(e.into());
        }

        self.registry.deliver(
            receiver,
            &OutboundEvent::FriendRequestReceived {
                sender_id: sender.clone(),
            },
        );
        self.registry.deliver(
            sender,
            &OutboundEvent::FriendRequestSent {
                receiver_id: receiver.clone(),
            },
        );
        info!(%sender, %receiver, "Friend request sent");
        Ok(())
    }

    /// `receiver` accepts the pending request from `sender`.
    pub async fn approve_request(
        &self,
        receiver: &Identity,
        sender: &Identity,
    ) -> Result<(), FriendRequestError> {
        if sender == receiver {
            return Err(FriendRequestError::SelfRequest);
        }
        let _guard = self.locks.lock_pair(receiver, sender).await;

        let pending = self
            .profiles
            .find_profile(receiver)
            .await?
            .is_some_and(|p| p.friend_requests_received.contains(sender));
        if !pending {
            return Err(FriendRequestError::NoPendingRequest(sender.clone()));
        }

        self.profiles
            .move_between_sets(
                receiver,
                RelationSet::FriendRequestsReceived,
                RelationSet::Friends,
                sender,
            )
            .await?;

        // A crossing request in the other direction is settled by this approval.
        let remaining = async {
            self.profiles
                .remove_from_set(receiver, RelationSet::FriendRequestsSent, sender)
                .await?;
            self.profiles
                .move_between_sets(
                    sender,
                    RelationSet::FriendRequestsSent,
                    RelationSet::Friends,
                    receiver,
                )
                .await?;
            self.profiles
                .remove_from_set(sender, RelationSet::FriendRequestsReceived, receiver)
                .await
        };

        if let Err(e) = remaining.await {
            if let Err(undo) = self
                .profiles
                .move_between_sets(
                    receiver,
                    RelationSet::Friends,
                    RelationSet::FriendRequestsReceived,
                    sender,
                )
                .await
            {
                error!(%receiver, %sender, error = %undo, "Failed to roll back approval");
            }
            return Err(e.into());
        }

        self.registry.deliver(
            receiver,
            &OutboundEvent::FriendRequestApproved(Counterparty::SenderId(sender.clone())),
        );
        self.registry.deliver(
            sender,
            &OutboundEvent::FriendRequestApproved(Counterparty::ReceiverId(receiver.clone())),
        );
        info!(%receiver, %sender, "Friend request approved");
        Ok(())
    }

    /// Clear any pending request between `canceler` and `target`.
    ///
    /// Works in both directions: the requester withdraws, the recipient
    /// declines. Idempotent.
    pub async fn cancel_request(
        &self,
        canceler: &Identity,
        target: &Identity,
    ) -> Result<(), FriendRequestError> {
        if canceler == target {
            return Err(FriendRequestError::SelfRequest);
        }
        let _guard = self.locks.lock_pair(canceler, target).await;

        let mut removed = 0;
        for (owner, set, member) in [
            (canceler, RelationSet::FriendRequestsSent, target),
            (target, RelationSet::FriendRequestsReceived, canceler),
            (canceler, RelationSet::FriendRequestsReceived, target),
            (target, RelationSet::FriendRequestsSent, canceler),
        ] {
            if self.profiles.remove_from_set(owner, set, member).await? {
                removed += 1;
            }
        }

        self.registry.deliver(
            canceler,
            &OutboundEvent::FriendRequestCanceled(Counterparty::ReceiverId(target.clone())),
        );
        self.registry.deliver(
            target,
            &OutboundEvent::FriendRequestCanceled(Counterparty::SenderId(canceler.clone())),
        );
        info!(%canceler, %target, removed, "Friend request canceled");
        Ok(())
    }

    async fn compensate(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
        operation: &'static str,
    ) {
        if let Err(e) = self.profiles.remove_from_set(identity, set, member).await {
            error!(%identity, %member, operation, error = %e, "Compensation failed");
        }
    }
}
