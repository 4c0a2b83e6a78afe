//! Record store error types.

use billflow_shared::types::BillRecordId;
use thiserror::Error;

use super::state::{FileCreateState, MailSendState};

/// Errors raised by the record store and its state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Attempted an illegal file-creation flag transition.
    #[error("Invalid file state transition from {from} to {to}")]
    InvalidFileTransition {
        /// Current state.
        from: FileCreateState,
        /// Attempted target state.
        to: FileCreateState,
    },

    /// Attempted an illegal mail-send flag transition.
    #[error("Invalid mail state transition from {from} to {to}")]
    InvalidMailTransition {
        /// Current state.
        from: MailSendState,
        /// Attempted target state.
        to: MailSendState,
    },

    /// Record not found (or soft-deleted).
    #[error("Bill record {0} not found")]
    NotFound(BillRecordId),

    /// A persisted value could not be decoded.
    #[error("Corrupt record {id}: {reason}")]
    Corrupt {
        /// Record id.
        id: BillRecordId,
        /// What could not be decoded.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RecordError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFileTransition { .. } => "INVALID_FILE_TRANSITION",
            Self::InvalidMailTransition { .. } => "INVALID_MAIL_TRANSITION",
            Self::NotFound(_) => "RECORD_NOT_FOUND",
            Self::Corrupt { .. } => "CORRUPT_RECORD",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
