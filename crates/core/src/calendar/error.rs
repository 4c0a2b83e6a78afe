//! Calendar error types.

use thiserror::Error;

/// Errors that can occur during calendar computations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// Year/month pair does not name a calendar month.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },

    /// A recurring holiday entry is not a valid `MM-DD` value.
    #[error("Invalid recurring holiday '{0}', expected MM-DD")]
    InvalidHoliday(String),

    /// Every day within the search window is a weekend or a holiday.
    #[error("No business day found on or before {0}")]
    NoBusinessDay(chrono::NaiveDate),
}

impl CalendarError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMonth { .. } => "INVALID_MONTH",
            Self::InvalidHoliday(_) => "INVALID_HOLIDAY",
            Self::NoBusinessDay(_) => "NO_BUSINESS_DAY",
        }
    }
}
