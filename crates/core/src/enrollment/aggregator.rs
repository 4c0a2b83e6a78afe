//! Data aggregator: assembles the frozen bundle for one candidate.

use std::sync::Arc;

use crate::bundle::{BillDataBundle, BillingSummary};
use crate::calendar::HolidayCalendar;
use crate::erp::{ErpQuery, ErpSource};

use super::error::EnrollmentError;

/// Issues the four keyed ERP queries and combines them into a bundle.
pub struct DataAggregator<E: ErpSource> {
    erp: Arc<E>,
    calendar: HolidayCalendar,
}

impl<E: ErpSource> DataAggregator<E> {
    /// Creates an aggregator.
    #[must_use]
    pub fn new(erp: Arc<E>, calendar: HolidayCalendar) -> Self {
        Self { erp, calendar }
    }

    /// Builds the bundle for a query.
    ///
    /// # Errors
    ///
    /// Returns an error if any ERP call fails or the fallback due date
    /// cannot be computed.
    pub async fn aggregate(&self, query: &ErpQuery) -> Result<BillDataBundle, EnrollmentError> {
        let customer = self.erp.customer_profile(query).await?;
        let mut summary = self.erp.billing_summary(query).await?;
        let type_summary = self.erp.per_type_summary(query).await?;
        let items = self.erp.line_items(query).await?;

        if summary.bill_period.trim().is_empty() {
            summary.bill_period.clone_from(&query.bill_period);
        }
        apply_due_date_fallback(&mut summary, &self.calendar)?;

        Ok(BillDataBundle {
            customer,
            summary,
            type_summary,
            items,
        })
    }
}

/// Replaces the due date with the period's last business day when the
/// summary's selected-line count is below 1.
///
/// # Errors
///
/// Returns `InvalidPeriod` if the fallback applies and the period is not
/// `YYYYMM`.
pub fn apply_due_date_fallback(
    summary: &mut BillingSummary,
    calendar: &HolidayCalendar,
) -> Result<(), EnrollmentError> {
    if summary.sel_count >= 1 {
        return Ok(());
    }
    let (year, month) = parse_period(&summary.bill_period)?;
    let due = calendar.last_business_day(year, month)?;
    summary.due_date = due.format("%Y%m%d").to_string();
    Ok(())
}

fn parse_period(period: &str) -> Result<(i32, u32), EnrollmentError> {
    let invalid = || EnrollmentError::InvalidPeriod(period.to_string());
    let period = period.trim();
    if period.len() != 6 || !period.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year = period[..4].parse().map_err(|_| invalid())?;
    let month = period[4..].parse().map_err(|_| invalid())?;
    Ok((year, month))
}
