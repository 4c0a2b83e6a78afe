//! Business calendar.
//!
//! Computes the last business day of a month, used as the fallback due date
//! when the ERP billing summary carries no selected lines.

pub mod business_day;
pub mod error;

#[cfg(test)]
mod business_day_props;

pub use business_day::HolidayCalendar;
pub use error::CalendarError;
