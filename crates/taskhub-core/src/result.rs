//! Convenience result type alias for TaskHub.

use crate::error::AppError;

/// A specialized `Result` type for TaskHub operations.
pub type AppResult<T> = Result<T, AppError>;
