//! Enrollment error types.

use thiserror::Error;

use crate::calendar::CalendarError;
use crate::erp::ErpError;
use crate::record::RecordError;

/// Errors that can occur while enrolling a candidate.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// Neither a usable group number nor an order number.
    #[error("Customer {customer_code} has no usable correlation key")]
    NoCorrelationKey {
        /// Customer code.
        customer_code: String,
    },

    /// Dispatch day is not a day of month.
    #[error("Customer {customer_code} has invalid dispatch day {day}")]
    InvalidFixedDay {
        /// Customer code.
        customer_code: String,
        /// Offending day.
        day: u32,
    },

    /// Billing period is not `YYYYMM`.
    #[error("Invalid billing period '{0}'")]
    InvalidPeriod(String),

    /// ERP source failure.
    #[error(transparent)]
    Erp(#[from] ErpError),

    /// Record store failure.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Fallback due date could not be computed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Bundle could not be serialized.
    #[error("Failed to serialize bundle: {0}")]
    Serialization(String),
}

impl EnrollmentError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoCorrelationKey { .. } => "NO_CORRELATION_KEY",
            Self::InvalidFixedDay { .. } => "INVALID_FIXED_DAY",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::Erp(e) => e.error_code(),
            Self::Record(e) => e.error_code(),
            Self::Calendar(e) => e.error_code(),
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
