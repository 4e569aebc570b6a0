//! Friend-request domain errors.

use thiserror::Error;

use chateo_core::error::ErrorKind;
use chateo_core::{AppError, Identity};

/// Why a friend-request transition was refused.
#[derive(Debug, Error)]
pub enum FriendRequestError {
    /// Sender and receiver are the same identity.
    #[error("You cannot send a friend request to yourself")]
    SelfRequest,
    /// A request is already pending or the pair are already friends.
    #[error("Friend request to '{0}' already sent or you are already friends")]
    AlreadyRequestedOrFriends(Identity),
    /// The counterparty has no profile.
    #[error("User '{0}' not found")]
    UnknownUser(Identity),
    /// Approval without a pending request.
    #[error("No pending friend request from '{0}'")]
    NoPendingRequest(Identity),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<FriendRequestError> for AppError {
    fn from(err: FriendRequestError) -> Self {
        let kind = match &err {
            FriendRequestError::SelfRequest => ErrorKind::Validation,
            FriendRequestError::AlreadyRequestedOrFriends(_) => ErrorKind::Conflict,
            FriendRequestError::UnknownUser(_) | FriendRequestError::NoPendingRequest(_) => {
                ErrorKind::NotFound
            }
            FriendRequestError::Store(inner) => return inner.clone(),
        };
        AppError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: AppError = FriendRequestError::SelfRequest.into();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err: AppError =
            FriendRequestError::AlreadyRequestedOrFriends(Identity::from("bob")).into();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err: AppError = FriendRequestError::NoPendingRequest(Identity::from("bob")).into();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "No pending friend request from 'bob'");

        let err: AppError = FriendRequestError::Store(AppError::database("down")).into();
        assert!(err.is_store_failure());
    }
}
