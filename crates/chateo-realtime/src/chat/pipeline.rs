//! Message pipeline: validate, persist, then deliver to both parties.

use std::sync::Arc;

use tracing::debug;

use chateo_core::{AppError, AppResult, Identity};
use chateo_database::{MessageStore, ProfileStore};
use chateo_entity::Message;

use crate::channel::registry::ChannelRegistry;
use crate::locks::IdentityLocks;
use crate::message::types::OutboundEvent;
use crate::metrics::EngineMetrics;

use super::clock::MonotonicClock;

/// A directed sender → receiver edge.
#[derive(Debug, Clone, Copy)]
pub struct MessageEdge<'a> {
    /// Author.
    pub sender: &'a Identity,
    /// Addressee.
    pub receiver: &'a Identity,
}

impl<'a> MessageEdge<'a> {
    /// Identities a message on this edge is delivered to: receiver, then sender.
    pub fn endpoints(&self) -> Vec<&'a Identity> {
        if self.sender == self.receiver {
            vec![self.receiver]
        } else {
            vec![self.receiver, self.sender]
        }
    }
}

/// Persists direct messages and fans them out.
#[derive(Debug)]
pub struct MessagePipeline {
    profiles: Arc<dyn ProfileStore>,
    messages: Arc<dyn MessageStore>,
    registry: Arc<ChannelRegistry>,
    metrics: Arc<EngineMetrics>,
    /// Per-sender order of persist + deliver.
    locks: IdentityLocks,
    clock: MonotonicClock,
    max_length: usize,
}

impl MessagePipeline {
    /// Creates a new pipeline.
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
        registry: Arc<ChannelRegistry>,
        metrics: Arc<EngineMetrics>,
        max_length: usize,
    ) -> Self {
        Self {
            profiles,
            messages,
            registry,
            metrics,
            locks: IdentityLocks::new(),
            clock: MonotonicClock::new(),
            max_length,
        }
    }

    /// Send `text` from `sender` to `receiver`.
    ///
    /// No friendship is required. Delivery to an endpoint with no live
    /// connection is a no-op.
    pub async fn send(
        &self,
        sender: &Identity,
        receiver: &Identity,
        text: String,
    ) -> AppResult<Message> {
        self.validate(&text)?;
        if self.profiles.find_profile(receiver).await?.is_none() {
            return Err(AppError::not_found(format!("User '{receiver}' not found")));
        }

        let _guard = self.locks.lock(sender).await;

        let message = Message::new(sender.clone(), receiver.clone(), text, self.clock.now());
        self.messages.insert_message(&message).await?;
        self.metrics.message_persisted();

        let event = OutboundEvent::message(&message);
        let edge = MessageEdge { sender, receiver };
        let delivered: usize = edge
            .endpoints()
            .into_iter()
            .map(|identity| self.registry.deliver(identity, &event))
            .sum();

        debug!(
            message_id = %message.id,
            %sender,
            %receiver,
            delivered,
            "Message persisted and delivered"
        );
        Ok(message)
    }

    fn validate(&self, text: &str) -> AppResult<()> {
        if text.trim().is_empty() {
            return Err(AppError::validation("Message text must not be empty"));
        }
        let len = text.chars().count();
        if len > self.max_length {
            return Err(AppError::validation(format!(
                "Message text is {len} characters, the limit is {}",
                self.max_length
            )));
        }
        Ok(())
    }
}
