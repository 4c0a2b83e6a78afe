//! Trigger surface over the enrollment, render and dispatch stages.
//!
//! Stage errors are folded into [`AppError`] here so the scheduler and the
//! operator CLI see one error shape.

use std::sync::Arc;

use billflow_shared::types::BillRecordId;
use billflow_shared::{AppConfig, AppError, AppResult};
use chrono::Utc;

use crate::calendar::{CalendarError, HolidayCalendar};
use crate::dispatch::{
    DispatchError, DispatchOptions, DispatchOutcome, DispatchReport, DispatchService,
    GatewayError, NotificationGateway,
};
use crate::enrollment::{EnrollmentError, EnrollmentReport, EnrollmentService};
use crate::erp::{ErpError, ErpSource};
use crate::profile::{ProfileError, ProfileStore};
use crate::record::{BillRecordRepository, CheckpointStore, RecordError, RenderedArtifacts};
use crate::render::{RenderError, RenderOptions, RenderReport, RenderService, TemplateError};
use crate::storage::{StorageError, StorageService};

/// External collaborators of the pipeline.
pub struct Collaborators<E, R, C, P, G> {
    /// ERP source.
    pub erp: Arc<E>,
    /// Bill record store.
    pub records: Arc<R>,
    /// Batch checkpoint store.
    pub checkpoints: Arc<C>,
    /// Visibility profile store.
    pub profiles: Arc<P>,
    /// Notification gateway.
    pub gateway: Arc<G>,
    /// Template and statement storage.
    pub storage: StorageService,
}

/// The three stages wired to one set of collaborators.
pub struct Pipeline<E, R, C, P, G>
where
    E: ErpSource,
    R: BillRecordRepository,
    C: CheckpointStore,
    P: ProfileStore,
    G: NotificationGateway,
{
    enrollment: EnrollmentService<E, R>,
    render: RenderService<R, C, P>,
    dispatch: DispatchService<R, G>,
}

impl<E, R, C, P, G> Pipeline<E, R, C, P, G>
where
    E: ErpSource,
    R: BillRecordRepository,
    C: CheckpointStore,
    P: ProfileStore,
    G: NotificationGateway,
{
    /// Wires the stages.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the holiday calendar is malformed.
    pub fn new(config: &AppConfig, parts: Collaborators<E, R, C, P, G>) -> AppResult<Self> {
        let calendar = HolidayCalendar::from_config(&config.calendar)?;
        Ok(Self {
            enrollment: EnrollmentService::new(parts.erp, Arc::clone(&parts.records), calendar),
            render: RenderService::new(
                Arc::clone(&parts.records),
                parts.checkpoints,
                parts.profiles,
                parts.storage.clone(),
                RenderOptions::from_config(config),
            ),
            dispatch: DispatchService::new(
                parts.records,
                parts.gateway,
                parts.storage,
                DispatchOptions::from_config(config),
            ),
        })
    }

    /// Enrolls every eligible ERP candidate.
    pub async fn run_enrollment(&self) -> AppResult<EnrollmentReport> {
        Ok(self.enrollment.run(Utc::now()).await?)
    }

    /// Renders every pending record.
    pub async fn run_rendering(&self) -> AppResult<RenderReport> {
        Ok(self.render.run_batch(Utc::now()).await?)
    }

    /// Renders or re-renders one record.
    pub async fn render_record(&self, id: BillRecordId) -> AppResult<RenderedArtifacts> {
        Ok(self.render.render_record(id, Utc::now()).await?)
    }

    /// Dispatches today's candidates, or those of `day_override`.
    pub async fn run_dispatch(&self, day_override: Option<u32>) -> AppResult<DispatchReport> {
        if let Some(day) = day_override
            && !(1..=31).contains(&day)
        {
            return Err(AppError::Validation(format!(
                "dispatch day must be within 1..=31, got {day}"
            )));
        }
        Ok(self.dispatch.run(Utc::now(), day_override).await?)
    }

    /// Dispatches one record on operator request.
    pub async fn run_dispatch_for_record(&self, id: BillRecordId) -> AppResult<DispatchOutcome> {
        Ok(self.dispatch.dispatch_record(id, Utc::now()).await?)
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(id) => Self::NotFound(format!("bill record {id}")),
            RecordError::Database(_) => Self::Database(err.to_string()),
            RecordError::InvalidFileTransition { .. } | RecordError::InvalidMailTransition { .. } => {
                Self::Validation(err.to_string())
            }
            RecordError::Corrupt { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<ErpError> for AppError {
    fn from(err: ErpError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Configuration(_) => Self::Config(err.to_string()),
            StorageError::NotFound { .. } | StorageError::Operation(_) => {
                Self::Storage(err.to_string())
            }
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Missing(_) => Self::Config(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Missing(_) => Self::NotFound(err.to_string()),
            ProfileError::Store(_) => Self::Database(err.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::Erp(inner) => inner.into(),
            EnrollmentError::Record(inner) => inner.into(),
            EnrollmentError::Calendar(inner) => inner.into(),
            EnrollmentError::NoCorrelationKey { .. }
            | EnrollmentError::InvalidFixedDay { .. }
            | EnrollmentError::InvalidPeriod(_) => Self::Validation(err.to_string()),
            EnrollmentError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Template(inner) => inner.into(),
            RenderError::Profile(inner) => inner.into(),
            RenderError::Storage(inner) => inner.into(),
            RenderError::Record(inner) => inner.into(),
            RenderError::Validation(_) | RenderError::NotRenderable { .. } => {
                Self::Validation(err.to_string())
            }
            RenderError::Spreadsheet(_) => Self::Internal(err.to_string()),
            RenderError::BatchAborted { .. } => Self::BatchAborted(err.to_string()),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Gateway(inner) => inner.into(),
            DispatchError::Template(inner) => inner.into(),
            DispatchError::Storage(inner) => inner.into(),
            DispatchError::Record(inner) => inner.into(),
            DispatchError::NotFound(id) => Self::NotFound(format!("bill record {id}")),
            DispatchError::Validation(_) | DispatchError::NotDispatchable { .. } => {
                Self::Validation(err.to_string())
            }
        }
    }
}
