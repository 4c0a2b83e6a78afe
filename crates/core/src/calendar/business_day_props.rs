//! Property-based tests for the business calendar.

use billflow_shared::config::CalendarConfig;
use chrono::{Datelike, Days};
use proptest::prelude::*;

use super::business_day::HolidayCalendar;

fn default_calendar() -> HolidayCalendar {
    HolidayCalendar::from_config(&CalendarConfig::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The result is a business day of the requested month.
    #[test]
    fn prop_result_is_business_day_in_month(year in 1990i32..2100, month in 1u32..=12) {
        let calendar = default_calendar();
        let day = calendar.last_business_day(year, month).unwrap();

        prop_assert!(calendar.is_business_day(day));
        prop_assert_eq!(day.year(), year);
        prop_assert_eq!(day.month(), month);
    }

    /// No later day in the same month is a business day.
    #[test]
    fn prop_no_later_business_day(year in 1990i32..2100, month in 1u32..=12) {
        let calendar = default_calendar();
        let day = calendar.last_business_day(year, month).unwrap();

        let mut next = day.checked_add_days(Days::new(1)).unwrap();
        while next.month() == month {
            prop_assert!(!calendar.is_business_day(next));
            next = next.checked_add_days(Days::new(1)).unwrap();
        }
    }
}
