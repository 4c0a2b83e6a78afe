//! ERP source error types.

use thiserror::Error;

/// Errors raised by the ERP source.
#[derive(Debug, Error)]
pub enum ErpError {
    /// Could not reach the ERP bridge.
    #[error("ERP connection failed: {0}")]
    Connection(String),

    /// Call exceeded the configured timeout.
    #[error("ERP call timed out after {0}s")]
    Timeout(u64),

    /// Bridge answered with a non-success status.
    #[error("ERP bridge returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Response could not be decoded.
    #[error("Failed to decode ERP response: {0}")]
    Decode(String),
}

impl ErpError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "ERP_CONNECTION",
            Self::Timeout(_) => "ERP_TIMEOUT",
            Self::Status { .. } => "ERP_STATUS",
            Self::Decode(_) => "ERP_DECODE",
        }
    }
}
