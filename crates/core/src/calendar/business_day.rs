//! Last-business-day computation over a holiday calendar.

use std::collections::BTreeSet;

use billflow_shared::config::CalendarConfig;
use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::error::CalendarError;

/// Upper bound on backward steps; a full year of non-business days means the
/// holiday data is broken.
const MAX_STEPS: u32 = 366;

/// Holiday set: `MM-DD` entries recurring every year plus explicit dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    recurring: BTreeSet<(u32, u32)>,
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Creates an empty calendar (weekends only).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the calendar from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHoliday` if a recurring entry is not `MM-DD`.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let mut calendar = Self::new();
        for entry in &config.fixed_holidays {
            let (month, day) = parse_month_day(entry)?;
            calendar.recurring.insert((month, day));
        }
        calendar.dates.extend(config.extra_holidays.iter().copied());
        Ok(calendar)
    }

    /// Adds a holiday recurring every year.
    #[must_use]
    pub fn with_recurring(mut self, month: u32, day: u32) -> Self {
        self.recurring.insert((month, day));
        self
    }

    /// Adds a one-off holiday.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.dates.insert(date);
        self
    }

    /// Returns true if the date is in the holiday set for its year.
    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date) || self.recurring.contains(&(date.month(), date.day()))
    }

    /// Returns true if the date is neither a weekend nor a holiday.
    #[must_use]
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    /// Returns the last business day of the month.
    ///
    /// Starts at the last calendar day and steps back one day at a time while
    /// the day is a weekend or a holiday.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` for an out-of-range month, or `NoBusinessDay`
    /// if the holiday data leaves no business day within a year.
    pub fn last_business_day(&self, year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
        let mut day = last_day_of_month(year, month)?;
        for _ in 0..MAX_STEPS {
            if self.is_business_day(day) {
                return Ok(day);
            }
            day = day
                .checked_sub_days(Days::new(1))
                .ok_or(CalendarError::NoBusinessDay(day))?;
        }
        Err(CalendarError::NoBusinessDay(day))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or(CalendarError::InvalidMonth { year, month })
}

fn parse_month_day(entry: &str) -> Result<(u32, u32), CalendarError> {
    let invalid = || CalendarError::InvalidHoliday(entry.to_string());
    let (month, day) = entry.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    // 2024 is a leap year, so 02-29 is accepted.
    NaiveDate::from_ymd_opt(2024, month, day).ok_or_else(invalid)?;
    Ok((month, day))
}
