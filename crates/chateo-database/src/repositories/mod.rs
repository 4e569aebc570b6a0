//! PostgreSQL repository implementations of the Store traits.

pub mod message;
pub mod profile;

pub use message::PgMessageRepository;
pub use profile::PgProfileRepository;
