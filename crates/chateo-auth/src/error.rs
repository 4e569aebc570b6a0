//! Credential verification failures.

use thiserror::Error;

use chateo_core::AppError;
use chateo_core::error::ErrorKind;

/// Why a presented credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was presented.
    #[error("Authentication token is missing")]
    Missing,
    /// The token failed signature, format, or claim checks.
    #[error("Invalid authentication token: {0}")]
    Invalid(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(ErrorKind::Authentication, err.to_string())
    }
}
