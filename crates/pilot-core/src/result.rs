//! Convenience result type alias for pilot.

use crate::error::AppError;

/// A specialized `Result` type for pilot operations.
pub type AppResult<T> = Result<T, AppError>;
