//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Stage-specific errors from the pipeline are folded into these variants at
/// the trigger surface, so callers (scheduler, operator CLI) see one shape.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A batch stopped before processing its full candidate set.
    #[error("Batch aborted: {0}")]
    BatchAborted(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// File storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// External service error (ERP source, notification gateway).
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true if re-running the same trigger may succeed without
    /// manual intervention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BatchAborted(_) | Self::Database(_) | Self::Storage(_) | Self::ExternalService(_)
        )
    }

    /// Returns the error code for logs and operator output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BatchAborted(_) => "BATCH_ABORTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
