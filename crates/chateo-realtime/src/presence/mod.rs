//! Presence tracking (online/offline with last-seen).

pub mod tracker;

pub use tracker::{PresenceSnapshot, PresenceTracker};
