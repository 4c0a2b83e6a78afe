//! Dispatch engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use billflow_shared::AppConfig;
use billflow_shared::config::{AttachmentKind, DispatchConfig};
use billflow_shared::types::BillRecordId;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use garde::Validate;
use serde::Serialize;
use tracing::{error, info, warn};

use super::content::{ContentAssembler, MailVariables};
use super::error::DispatchError;
use super::gateway::{NotificationGateway, NotificationRequest};
use crate::record::{
    AttemptOutcome, BillRecord, BillRecordRepository, DispatchAttempt, RenderedArtifact,
};
use crate::render::{Template, TemplateError};
use crate::storage::{StorageError, StorageService, join_key};
use crate::validation::{not_blank, validate_struct};

/// Settings the dispatch engine needs from the application config.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Dispatch section of the config.
    pub dispatch: DispatchConfig,
    /// Gateway response code that denotes success.
    pub success_code: String,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_address: String,
    /// Fixed routing metadata.
    pub routing: BTreeMap<String, String>,
    /// Storage prefix of the notification template.
    pub template_prefix: String,
    /// Zone that defines "today".
    pub timezone: Tz,
}

impl DispatchOptions {
    /// Extracts the dispatch options.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            dispatch: config.dispatch.clone(),
            success_code: config.gateway.success_code.clone(),
            from_name: config.gateway.from_name.clone(),
            from_address: config.gateway.from_address.clone(),
            routing: config.gateway.routing.clone(),
            template_prefix: config.storage.template_prefix.clone(),
            timezone: config.calendar.timezone,
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An attempt was made and logged.
    Attempted(AttemptOutcome),
    /// Already sent successfully today.
    SkippedSameDay,
    /// Automatic attempts exhausted.
    SkippedAttemptLimit,
}

/// Counts for one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Day of month the candidates were selected for.
    pub day: u32,
    /// Candidates selected.
    pub candidates: usize,
    /// Sent successfully.
    pub sent: usize,
    /// Gateway answered with a non-success code.
    pub rejected: usize,
    /// Gateway unreachable or timed out.
    pub failed: usize,
    /// Failed pre-send validation.
    pub invalid: usize,
    /// Skipped by the same-day guard.
    pub skipped_same_day: usize,
    /// Skipped by the attempt cap.
    pub skipped_attempt_limit: usize,
    /// Record store errors.
    pub errors: usize,
}

impl DispatchReport {
    fn count(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Attempted(AttemptOutcome::Delivered(_)) => self.sent += 1,
            DispatchOutcome::Attempted(AttemptOutcome::Rejected(_)) => self.rejected += 1,
            DispatchOutcome::Attempted(AttemptOutcome::Failed(_)) => self.failed += 1,
            DispatchOutcome::Attempted(AttemptOutcome::Invalid(_)) => self.invalid += 1,
            DispatchOutcome::SkippedSameDay => self.skipped_same_day += 1,
            DispatchOutcome::SkippedAttemptLimit => self.skipped_attempt_limit += 1,
        }
    }
}

/// Fields checked before a record is sent.
#[derive(Debug, Validate)]
struct DispatchTarget {
    #[garde(custom(not_blank))]
    business_id: String,
    #[garde(custom(not_blank))]
    customer_name: String,
    #[garde(email)]
    email: String,
    #[garde(email)]
    email_cc: Option<String>,
}

enum Prepared {
    Send(Box<NotificationRequest>),
    Done(DispatchOutcome),
}

/// Sends rendered statements through the notification gateway.
pub struct DispatchService<R: BillRecordRepository, G: NotificationGateway> {
    records: Arc<R>,
    gateway: Arc<G>,
    storage: StorageService,
    options: DispatchOptions,
}

impl<R: BillRecordRepository, G: NotificationGateway> DispatchService<R, G> {
    /// Creates the service.
    #[must_use]
    pub fn new(
        records: Arc<R>,
        gateway: Arc<G>,
        storage: StorageService,
        options: DispatchOptions,
    ) -> Self {
        Self {
            records,
            gateway,
            storage,
            options,
        }
    }

    /// Dispatches every automated candidate for today, or for `day_override`.
    ///
    /// Sends are sequential with a fixed pause between gateway calls. Every
    /// candidate is processed; per-record failures are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification template cannot be loaded or the
    /// candidate query fails.
    pub async fn run(
        &self,
        now: DateTime<Utc>,
        day_override: Option<u32>,
    ) -> Result<DispatchReport, DispatchError> {
        let today = self.today(now);
        let day = day_override.unwrap_or_else(|| today.day());
        let assembler = self.load_content().await?;
        let candidates = self.records.list_dispatch_candidates(day).await?;

        let mut report = DispatchReport {
            day,
            candidates: candidates.len(),
            ..DispatchReport::default()
        };
        info!(stage = "dispatch", day, candidates = candidates.len(), "dispatch started");

        let mut gateway_called = false;
        for record in &candidates {
            let result = match self.prepare(record, &assembler, now, today, false).await {
                Ok(Prepared::Done(outcome)) => Ok(outcome),
                Ok(Prepared::Send(request)) => {
                    if gateway_called {
                        tokio::time::sleep(self.options.dispatch.throttle()).await;
                    }
                    gateway_called = true;
                    self.send(record, &request, now, today, false).await
                }
                Err(err) => Err(err),
            };

            match result {
                Ok(outcome) => {
                    log_outcome(record, &outcome);
                    report.count(&outcome);
                }
                Err(err) => {
                    report.errors += 1;
                    error!(
                        stage = "dispatch",
                        record_id = %record.id,
                        code = err.error_code(),
                        error = %err,
                        "dispatch failed"
                    );
                }
            }
        }

        info!(
            stage = "dispatch",
            day,
            sent = report.sent,
            rejected = report.rejected,
            failed = report.failed,
            invalid = report.invalid,
            skipped_same_day = report.skipped_same_day,
            skipped_attempt_limit = report.skipped_attempt_limit,
            "dispatch finished"
        );
        Ok(report)
    }

    /// Dispatches one record on operator request.
    ///
    /// Bypasses the fixed-day and mail-flag filters, the same-day guard and
    /// the attempt cap; the record must still have automatic sending enabled
    /// and rendered files.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `NotDispatchable`, or a template or record store
    /// error.
    pub async fn dispatch_record(
        &self,
        id: BillRecordId,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or(DispatchError::NotFound(id))?;
        if !record.is_dispatchable() {
            let reason = if record.send_auto {
                format!("statement files not created (flag {})", record.file_state)
            } else {
                "automatic sending is disabled".to_string()
            };
            return Err(DispatchError::NotDispatchable { id, reason });
        }

        let today = self.today(now);
        let assembler = self.load_content().await?;
        let outcome = match self.prepare(&record, &assembler, now, today, true).await? {
            Prepared::Done(outcome) => outcome,
            Prepared::Send(request) => self.send(&record, &request, now, today, true).await?,
        };
        log_outcome(&record, &outcome);
        Ok(outcome)
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.options.timezone).date_naive()
    }

    async fn load_content(&self) -> Result<ContentAssembler, DispatchError> {
        let key = join_key(&[
            &self.options.template_prefix,
            &self.options.dispatch.mail_template,
        ]);
        let bytes = match self.storage.read(&key).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound { .. }) => return Err(TemplateError::Missing(key).into()),
            Err(err) => return Err(err.into()),
        };
        let body = Template::from_bytes(&key, &bytes)?;
        ContentAssembler::new(&body, &self.options.dispatch.subject_template)
    }

    /// Applies the guards and validation, then builds the request.
    async fn prepare(
        &self,
        record: &BillRecord,
        assembler: &ContentAssembler,
        now: DateTime<Utc>,
        today: NaiveDate,
        manual: bool,
    ) -> Result<Prepared, DispatchError> {
        if !manual {
            if let Some(max) = self.options.dispatch.max_attempts
                && record.dispatch_attempts >= max
            {
                return Ok(Prepared::Done(DispatchOutcome::SkippedAttemptLimit));
            }
            if self.records.has_successful_send_on(record.id, today).await? {
                return Ok(Prepared::Done(DispatchOutcome::SkippedSameDay));
            }
        }

        let attachment = match self.validate(record).await {
            Ok(attachment) => attachment,
            Err(outcome) => {
                self.log_attempt(record, outcome.clone(), now, today, manual)
                    .await?;
                return Ok(Prepared::Done(DispatchOutcome::Attempted(outcome)));
            }
        };

        let variables =
            MailVariables::resolve(record, &self.options.dispatch.default_customer_label, today);
        if !variables.defaulted.is_empty() {
            warn!(
                stage = "dispatch",
                record_id = %record.id,
                defaulted = ?variables.defaulted,
                "notification variables fell back to defaults"
            );
        }
        let content = assembler.assemble(&variables)?;

        Ok(Prepared::Send(Box::new(NotificationRequest {
            recipient: record.email.clone().unwrap_or_default().trim().to_string(),
            cc: non_blank(record.email_cc.as_deref()),
            subject: content.subject,
            html_body: content.html_body,
            from_name: self.options.from_name.clone(),
            from_address: self.options.from_address.clone(),
            attachment_name: attachment.display_name.clone(),
            attachment_path: attachment.key(),
            routing: self.options.routing.clone(),
        })))
    }

    /// Validates identity, recipients and the attachment.
    ///
    /// A storage failure while checking the attachment is a `Failed`
    /// attempt, not an `Invalid` one.
    async fn validate(&self, record: &BillRecord) -> Result<RenderedArtifact, AttemptOutcome> {
        let target = DispatchTarget {
            business_id: record.business_id.clone(),
            customer_name: record.customer_name.clone(),
            email: record.email.clone().unwrap_or_default().trim().to_string(),
            email_cc: non_blank(record.email_cc.as_deref()),
        };
        validate_struct(&target).map_err(AttemptOutcome::Invalid)?;

        let artifact = match self.options.dispatch.attachment {
            AttachmentKind::Html => record.html.as_ref(),
            AttachmentKind::Excel => record.excel.as_ref(),
        }
        .ok_or_else(|| AttemptOutcome::Invalid("no rendered attachment on record".to_string()))?;
        match self.storage.exists(&artifact.key()).await {
            Ok(true) => Ok(artifact.clone()),
            Ok(false) => Err(AttemptOutcome::Invalid(format!(
                "attachment not found: {}",
                artifact.key()
            ))),
            Err(err) => Err(AttemptOutcome::Failed(format!(
                "attachment check failed: {err}"
            ))),
        }
    }

    async fn send(
        &self,
        record: &BillRecord,
        request: &NotificationRequest,
        now: DateTime<Utc>,
        today: NaiveDate,
        manual: bool,
    ) -> Result<DispatchOutcome, DispatchError> {
        let outcome = match self.gateway.send(request).await {
            Ok(response) if response.code == self.options.success_code => {
                AttemptOutcome::Delivered(response)
            }
            Ok(response) => AttemptOutcome::Rejected(response),
            Err(err) => AttemptOutcome::Failed(err.to_string()),
        };
        self.log_attempt(record, outcome.clone(), now, today, manual)
            .await?;
        Ok(DispatchOutcome::Attempted(outcome))
    }

    async fn log_attempt(
        &self,
        record: &BillRecord,
        outcome: AttemptOutcome,
        now: DateTime<Utc>,
        today: NaiveDate,
        manual: bool,
    ) -> Result<(), DispatchError> {
        self.records
            .record_dispatch_attempt(DispatchAttempt {
                record_id: record.id,
                outcome,
                manual,
                attempted_at: now,
                attempted_on: today,
            })
            .await?;
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn log_outcome(record: &BillRecord, outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Attempted(AttemptOutcome::Delivered(response)) => info!(
            stage = "dispatch",
            record_id = %record.id,
            business_id = %record.business_id,
            code = %response.code,
            key = %response.key,
            "statement sent"
        ),
        DispatchOutcome::Attempted(attempt) => warn!(
            stage = "dispatch",
            record_id = %record.id,
            business_id = %record.business_id,
            outcome = attempt.label(),
            detail = %attempt.detail(),
            "statement not sent"
        ),
        DispatchOutcome::SkippedSameDay => info!(
            stage = "dispatch",
            record_id = %record.id,
            "already sent today, skipped"
        ),
        DispatchOutcome::SkippedAttemptLimit => info!(
            stage = "dispatch",
            record_id = %record.id,
            attempts = record.dispatch_attempts,
            "attempt limit reached, skipped"
        ),
    }
}
