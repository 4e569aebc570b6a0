//! # chateo-entity
//!
//! Domain entity models for Chateo. Every struct in this crate represents
//! a stored document or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod message;
pub mod presence;
pub mod profile;

pub use message::{DeliveryStatus, Message};
pub use presence::PresenceStatus;
pub use profile::{Profile, RelationSet};
