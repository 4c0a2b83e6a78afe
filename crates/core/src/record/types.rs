//! Bill record domain types.

use billflow_shared::types::BillRecordId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::state::{FileCreateState, MailSendState};
use crate::erp::{CorrelationKey, EnrollmentCandidate};

/// Enrollment/job record for one customer statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BillRecord {
    /// Sequence id.
    pub id: BillRecordId,
    /// 10-digit business registration number.
    pub business_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// ERP customer code.
    pub customer_code: String,
    /// Group number correlation identifier.
    pub group_no: Option<String>,
    /// Order number correlation identifier.
    pub order_no: Option<String>,
    /// Day of month on which the statement is dispatched automatically.
    pub fixed_day: u32,
    /// Primary recipient.
    pub email: Option<String>,
    /// Secondary recipient, sent as cc.
    pub email_cc: Option<String>,
    /// Billing period, `YYYYMM`.
    pub bill_period: String,
    /// Frozen bundle JSON captured at enrollment.
    pub bundle: String,
    /// Whether automated dispatch is enabled.
    pub send_auto: bool,
    /// File creation flag.
    pub file_state: FileCreateState,
    /// Mail send flag.
    pub mail_state: MailSendState,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Rendered HTML statement.
    pub html: Option<RenderedArtifact>,
    /// Rendered Excel ledger.
    pub excel: Option<RenderedArtifact>,
    /// Last response from the notification gateway.
    pub last_response: Option<GatewayResponse>,
    /// Automatic dispatch attempts so far.
    pub dispatch_attempts: u32,
    /// Reason for the last render failure.
    pub render_error: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When files were last rendered.
    pub file_created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// When the statement was sent.
    pub mail_sent_at: Option<DateTime<Utc>>,
}

impl BillRecord {
    /// Returns true if the record may be picked up by dispatch at all.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        !self.deleted && self.send_auto && self.file_state == FileCreateState::Created
    }

    /// Returns true if the record is an automated candidate on `day`.
    #[must_use]
    pub fn is_due_on(&self, day: u32) -> bool {
        self.is_dispatchable() && self.mail_state == MailSendState::Pending && self.fixed_day == day
    }
}

/// Insert payload for a freshly enrolled record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBillRecord {
    /// 10-digit business registration number.
    pub business_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// ERP customer code.
    pub customer_code: String,
    /// Group number correlation identifier.
    pub group_no: Option<String>,
    /// Order number correlation identifier.
    pub order_no: Option<String>,
    /// Dispatch day of month.
    pub fixed_day: u32,
    /// Primary recipient.
    pub email: Option<String>,
    /// Secondary recipient.
    pub email_cc: Option<String>,
    /// Billing period, `YYYYMM`.
    pub bill_period: String,
    /// Frozen bundle JSON.
    pub bundle: String,
    /// Whether automated dispatch is enabled.
    pub send_auto: bool,
    /// Initial file creation flag.
    pub file_state: FileCreateState,
    /// Initial mail send flag.
    pub mail_state: MailSendState,
    /// Initial soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl NewBillRecord {
    /// Builds the record for an accepted candidate and its frozen bundle.
    ///
    /// Flags start at `N` and both timestamps are `now`.
    #[must_use]
    pub fn from_enrollment(
        candidate: &EnrollmentCandidate,
        bill_period: String,
        bundle: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            business_id: candidate.business_id.clone(),
            customer_name: candidate.customer_name.clone(),
            customer_code: candidate.customer_code.clone(),
            group_no: candidate.group_no.clone(),
            order_no: candidate.order_no.clone(),
            fixed_day: candidate.fixed_day,
            email: candidate.email.clone(),
            email_cc: candidate.email_cc.clone(),
            bill_period,
            bundle,
            send_auto: candidate.send_auto,
            file_state: FileCreateState::Pending,
            mail_state: MailSendState::Pending,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lookup for an existing enrollment of the same customer and correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateProbe {
    /// Business id.
    pub business_id: String,
    /// Customer code.
    pub customer_code: String,
    /// Correlation key selected for the candidate.
    pub key: CorrelationKey,
}

impl DuplicateProbe {
    /// Returns true if `record` is a live enrollment matching this probe.
    ///
    /// A match requires the same business id and customer code, and the
    /// same value in the column the key was selected from. An order key
    /// never matches on group, so a zero or blank group is not shared.
    #[must_use]
    pub fn matches(&self, record: &BillRecord) -> bool {
        let column = match &self.key {
            CorrelationKey::Group(_) => record.group_no.as_deref(),
            CorrelationKey::Order(_) => record.order_no.as_deref(),
        };
        !record.deleted
            && record.business_id == self.business_id
            && record.customer_code == self.customer_code
            && column.is_some_and(|value| value.trim() == self.key.value())
    }
}

/// One rendered file: display name plus its collision-resistant storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    /// Human-readable file name.
    pub display_name: String,
    /// Unique storage file name.
    pub storage_name: String,
    /// Directory path within storage.
    pub storage_path: String,
}

impl RenderedArtifact {
    /// Full storage key.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.storage_path, self.storage_name)
    }
}

/// The HTML and Excel outputs of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    /// HTML statement.
    pub html: RenderedArtifact,
    /// Excel ledger.
    pub excel: RenderedArtifact,
}

/// Response returned by the notification gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Result code.
    pub code: String,
    /// Result message.
    pub message: String,
    /// Gateway-side message key.
    pub key: String,
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Gateway returned the success code.
    Delivered(GatewayResponse),
    /// Gateway responded with any other code.
    Rejected(GatewayResponse),
    /// Record failed pre-send validation.
    Invalid(String),
    /// Gateway could not be reached or the call timed out.
    Failed(String),
}

impl AttemptOutcome {
    /// Returns true for a successful send.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// Gateway response, when the gateway answered.
    #[must_use]
    pub fn response(&self) -> Option<&GatewayResponse> {
        match self {
            Self::Delivered(response) | Self::Rejected(response) => Some(response),
            Self::Invalid(_) | Self::Failed(_) => None,
        }
    }

    /// Short outcome label stored in the dispatch log.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered(_) => "SENT",
            Self::Rejected(_) => "REJECTED",
            Self::Invalid(_) => "INVALID",
            Self::Failed(_) => "FAILED",
        }
    }

    /// Human-readable detail stored in the dispatch log.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Delivered(response) | Self::Rejected(response) => {
                format!("{}: {}", response.code, response.message)
            }
            Self::Invalid(reason) | Self::Failed(reason) => reason.clone(),
        }
    }
}

/// One entry in the dispatch log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchAttempt {
    /// Record the attempt was made for.
    pub record_id: BillRecordId,
    /// What happened.
    pub outcome: AttemptOutcome,
    /// Whether an operator triggered the attempt.
    pub manual: bool,
    /// Attempt timestamp.
    pub attempted_at: DateTime<Utc>,
    /// Local calendar date of the attempt, used by the same-day guard.
    pub attempted_on: NaiveDate,
}
