//! Friend-request state machine.

pub mod coordinator;
pub mod error;

pub use coordinator::FriendshipCoordinator;
pub use error::FriendRequestError;
