//! # chateo-database
//!
//! The Store contract the real-time core persists through, plus two
//! implementations: PostgreSQL repositories (sqlx) and a process-local
//! in-memory store.

pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use provider::Stores;
pub use store::{MessageStore, ProfileStore};
