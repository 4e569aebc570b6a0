//! Convenience result type alias for Chateo.

use crate::error::AppError;

/// A specialized `Result` type for Chateo operations.
pub type AppResult<T> = Result<T, AppError>;
