//! Dispatch error types.

use billflow_shared::types::BillRecordId;
use thiserror::Error;

use crate::record::RecordError;
use crate::render::TemplateError;
use crate::storage::StorageError;

/// Errors raised by a notification gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Gateway could not be reached.
    #[error("Gateway transport failed: {0}")]
    Transport(String),

    /// Call exceeded the configured timeout.
    #[error("Gateway call timed out after {0}s")]
    Timeout(u64),

    /// Gateway answered with a non-success HTTP status.
    #[error("Gateway returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Request could not be built (bad address, bad header).
    #[error("Invalid notification request: {0}")]
    InvalidRequest(String),

    /// Attachment could not be read from storage.
    #[error("Attachment unavailable: {0}")]
    Attachment(String),
}

impl GatewayError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "GATEWAY_TRANSPORT",
            Self::Timeout(_) => "GATEWAY_TIMEOUT",
            Self::Status { .. } => "GATEWAY_STATUS",
            Self::InvalidRequest(_) => "GATEWAY_INVALID_REQUEST",
            Self::Attachment(_) => "GATEWAY_ATTACHMENT",
        }
    }
}

/// Errors raised by the dispatch engine.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Record failed pre-send validation.
    #[error("Dispatch validation failed: {0}")]
    Validation(String),

    /// Gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Unknown or deleted record.
    #[error("Bill record {0} not found")]
    NotFound(BillRecordId),

    /// Record exists but may not be dispatched.
    #[error("Bill record {id} is not dispatchable: {reason}")]
    NotDispatchable {
        /// Record id.
        id: BillRecordId,
        /// Why it was rejected.
        reason: String,
    },

    /// Notification template could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Record store failure.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl DispatchError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "DISPATCH_VALIDATION",
            Self::Gateway(err) => err.error_code(),
            Self::NotFound(_) => "DISPATCH_RECORD_NOT_FOUND",
            Self::NotDispatchable { .. } => "DISPATCH_NOT_DISPATCHABLE",
            Self::Template(err) => err.error_code(),
            Self::Storage(err) => err.error_code(),
            Self::Record(err) => err.error_code(),
        }
    }
}
