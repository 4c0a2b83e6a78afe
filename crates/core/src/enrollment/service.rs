//! Target selection, deduplication and enrollment.

use std::sync::Arc;

use billflow_shared::types::BillRecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::aggregator::DataAggregator;
use super::error::EnrollmentError;
use crate::calendar::HolidayCalendar;
use crate::erp::{CorrelationKey, EnrollmentCandidate, ErpQuery, ErpSource};
use crate::record::{BillRecordRepository, DuplicateProbe, NewBillRecord};

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    /// A new record was created.
    Enrolled(BillRecordId),
    /// A live record with the same customer and correlation already exists.
    DuplicateSkipped(BillRecordId),
    /// The candidate has no related bill lines.
    NoRelatedLines,
}

/// Counts for one enrollment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrollmentReport {
    /// Candidates returned by the ERP source.
    pub candidates: usize,
    /// New records created.
    pub enrolled: usize,
    /// Skipped as duplicates.
    pub skipped_duplicate: usize,
    /// Skipped for having no related lines.
    pub skipped_no_lines: usize,
    /// Failed with an error.
    pub failed: usize,
}

/// Enrollment service.
pub struct EnrollmentService<E: ErpSource, R: BillRecordRepository> {
    erp: Arc<E>,
    records: Arc<R>,
    aggregator: DataAggregator<E>,
}

impl<E: ErpSource, R: BillRecordRepository> EnrollmentService<E, R> {
    /// Creates the service.
    #[must_use]
    pub fn new(erp: Arc<E>, records: Arc<R>, calendar: HolidayCalendar) -> Self {
        let aggregator = DataAggregator::new(Arc::clone(&erp), calendar);
        Self {
            erp,
            records,
            aggregator,
        }
    }

    /// Enrolls every eligible candidate.
    ///
    /// Per-candidate failures are logged and counted; they never abort the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the candidate list cannot be fetched.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<EnrollmentReport, EnrollmentError> {
        let candidates = self.erp.list_enrollable().await?;
        let mut report = EnrollmentReport {
            candidates: candidates.len(),
            ..EnrollmentReport::default()
        };
        info!(stage = "enrollment", candidates = candidates.len(), "enrollment started");

        for candidate in &candidates {
            match self.enroll(candidate, now).await {
                Ok(EnrollmentOutcome::Enrolled(id)) => {
                    report.enrolled += 1;
                    info!(
                        stage = "enrollment",
                        record_id = %id,
                        business_id = %candidate.business_id,
                        "record enrolled"
                    );
                }
                Ok(EnrollmentOutcome::DuplicateSkipped(id)) => {
                    report.skipped_duplicate += 1;
                    info!(
                        stage = "enrollment",
                        record_id = %id,
                        business_id = %candidate.business_id,
                        customer_code = %candidate.customer_code,
                        "duplicate enrollment skipped"
                    );
                }
                Ok(EnrollmentOutcome::NoRelatedLines) => {
                    report.skipped_no_lines += 1;
                    info!(
                        stage = "enrollment",
                        business_id = %candidate.business_id,
                        customer_code = %candidate.customer_code,
                        "no related bill lines, skipped"
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        stage = "enrollment",
                        business_id = %candidate.business_id,
                        customer_code = %candidate.customer_code,
                        code = err.error_code(),
                        error = %err,
                        "enrollment failed"
                    );
                }
            }
        }

        info!(
            stage = "enrollment",
            enrolled = report.enrolled,
            skipped_duplicate = report.skipped_duplicate,
            skipped_no_lines = report.skipped_no_lines,
            failed = report.failed,
            "enrollment finished"
        );
        Ok(report)
    }

    /// Enrolls one candidate.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate has no usable correlation key, or
    /// any ERP or record store call fails.
    pub async fn enroll(
        &self,
        candidate: &EnrollmentCandidate,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        if !(1..=31).contains(&candidate.fixed_day) {
            return Err(EnrollmentError::InvalidFixedDay {
                customer_code: candidate.customer_code.clone(),
                day: candidate.fixed_day,
            });
        }
        let key = CorrelationKey::select(candidate.group_no.as_deref(), candidate.order_no.as_deref())
            .ok_or_else(|| EnrollmentError::NoCorrelationKey {
                customer_code: candidate.customer_code.clone(),
            })?;
        let probe = DuplicateProbe {
            business_id: candidate.business_id.clone(),
            customer_code: candidate.customer_code.clone(),
            key: key.clone(),
        };
        let query = ErpQuery::for_candidate(candidate, key);

        if self.erp.count_related_lines(&query).await? == 0 {
            return Ok(EnrollmentOutcome::NoRelatedLines);
        }

        if let Some(existing) = self.records.find_active_duplicate(&probe).await? {
            return Ok(EnrollmentOutcome::DuplicateSkipped(existing));
        }

        let bundle = self.aggregator.aggregate(&query).await?;
        let payload = bundle
            .to_json()
            .map_err(|e| EnrollmentError::Serialization(e.to_string()))?;
        let record = NewBillRecord::from_enrollment(
            candidate,
            bundle.summary.bill_period.clone(),
            payload,
            now,
        );

        let id = self.records.insert(record).await?;
        Ok(EnrollmentOutcome::Enrolled(id))
    }
}
