//! Statement render batches.

use std::sync::Arc;

use billflow_shared::AppConfig;
use billflow_shared::config::RenderConfig;
use billflow_shared::types::BillRecordId;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{RenderError, TemplateError};
use super::excel::ExcelRenderer;
use super::html::render_statement;
use super::template::Template;
use super::validate::parse_bundle;
use super::workbook::{first_sheet, read_workbook, write_workbook};
use crate::bundle::RenderContext;
use crate::profile::{ProfileStore, resolve_profile};
use crate::record::{
    BillRecord, BillRecordRepository, CheckpointStore, FileCreateState, RecordError,
    RenderedArtifact, RenderedArtifacts,
};
use crate::storage::{StorageError, StorageService, join_key, sanitize_filename};

/// Checkpoint stage name of the render batch.
pub const RENDER_STAGE: &str = "render";

/// Settings the render service needs from the application config.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Render section of the config.
    pub render: RenderConfig,
    /// Storage prefix of the master templates.
    pub template_prefix: String,
    /// Storage prefix of rendered statements.
    pub output_prefix: String,
    /// Zone used for the `TODAY` field.
    pub timezone: Tz,
}

impl RenderOptions {
    /// Extracts the render options.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            render: config.render.clone(),
            template_prefix: config.storage.template_prefix.clone(),
            output_prefix: config.storage.output_prefix.clone(),
            timezone: config.calendar.timezone,
        }
    }
}

/// Counts for one render batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Records rendered.
    pub rendered: u32,
    /// Records marked failed.
    pub failed: u32,
    /// Checkpoint the run resumed after.
    pub resumed_after: Option<BillRecordId>,
}

/// Master templates, loaded once per batch.
struct Templates {
    html: Template,
    excel: Vec<u8>,
}

/// Renders pending records into HTML statements and Excel ledgers.
pub struct RenderService<R, C, P>
where
    R: BillRecordRepository,
    C: CheckpointStore,
    P: ProfileStore,
{
    records: Arc<R>,
    checkpoints: Arc<C>,
    profiles: Arc<P>,
    storage: StorageService,
    options: RenderOptions,
    excel: ExcelRenderer,
}

impl<R, C, P> RenderService<R, C, P>
where
    R: BillRecordRepository,
    C: CheckpointStore,
    P: ProfileStore,
{
    /// Creates the service.
    #[must_use]
    pub fn new(
        records: Arc<R>,
        checkpoints: Arc<C>,
        profiles: Arc<P>,
        storage: StorageService,
        options: RenderOptions,
    ) -> Self {
        let excel = ExcelRenderer::new(options.render.excel.clone());
        Self {
            records,
            checkpoints,
            profiles,
            storage,
            options,
            excel,
        }
    }

    /// Renders every pending record, resuming after the stored checkpoint.
    ///
    /// Each failed record is marked `E`. The batch aborts once failures
    /// exceed the skip limit, keeping the checkpoint so the next run
    /// resumes after the last processed record; a completed run clears it.
    ///
    /// # Errors
    ///
    /// Returns `BatchAborted` past the skip limit, a template error if the
    /// master templates cannot be loaded, or a record store error.
    pub async fn run_batch(&self, now: DateTime<Utc>) -> Result<RenderReport, RenderError> {
        let templates = self.load_templates().await?;
        let limit = self.options.render.skip_limit;
        let mut cursor = self.checkpoints.load(RENDER_STAGE).await?;
        let mut report = RenderReport {
            resumed_after: cursor,
            ..RenderReport::default()
        };
        info!(stage = RENDER_STAGE, resumed_after = ?cursor, "render batch started");

        loop {
            let page = self
                .records
                .list_pending_render(cursor, self.options.render.page_size)
                .await?;
            if page.is_empty() {
                break;
            }

            for record in &page {
                match self.render_with(record, &templates, now).await {
                    Ok(_) => {
                        report.rendered += 1;
                        info!(
                            stage = RENDER_STAGE,
                            record_id = %record.id,
                            business_id = %record.business_id,
                            "statement rendered"
                        );
                    }
                    Err(err) => {
                        report.failed += 1;
                        warn!(
                            stage = RENDER_STAGE,
                            record_id = %record.id,
                            business_id = %record.business_id,
                            code = err.error_code(),
                            terminal = err.is_terminal(),
                            error = %err,
                            "render failed"
                        );
                        self.records
                            .mark_render_failed(record.id, err.to_string(), now)
                            .await?;
                        if report.failed > limit {
                            self.checkpoints.save(RENDER_STAGE, record.id).await?;
                            warn!(
                                stage = RENDER_STAGE,
                                failures = report.failed,
                                limit,
                                "render batch aborted"
                            );
                            return Err(RenderError::BatchAborted {
                                failures: report.failed,
                                limit,
                            });
                        }
                    }
                }
                cursor = Some(record.id);
                self.checkpoints.save(RENDER_STAGE, record.id).await?;
            }
        }

        self.checkpoints.clear(RENDER_STAGE).await?;
        info!(
            stage = RENDER_STAGE,
            rendered = report.rendered,
            failed = report.failed,
            "render batch finished"
        );
        Ok(report)
    }

    /// Renders one record on demand.
    ///
    /// A pending record that fails is marked `E`. A record that is already
    /// rendered keeps its previous artifacts when the re-render fails; the
    /// new references replace them only after both files are written.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids, `NotRenderable` for failed
    /// records, or the render error.
    pub async fn render_record(
        &self,
        id: BillRecordId,
        now: DateTime<Utc>,
    ) -> Result<RenderedArtifacts, RenderError> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or(RecordError::NotFound(id))?;
        if record.file_state == FileCreateState::Failed {
            return Err(RenderError::NotRenderable {
                id,
                reason: "render failed earlier and needs manual correction".to_string(),
            });
        }

        let result = match self.load_templates().await {
            Ok(templates) => self.render_with(&record, &templates, now).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(artifacts) => {
                info!(stage = RENDER_STAGE, record_id = %id, "statement re-rendered");
                Ok(artifacts)
            }
            Err(err) => {
                warn!(
                    stage = RENDER_STAGE,
                    record_id = %id,
                    code = err.error_code(),
                    error = %err,
                    "manual render failed"
                );
                if record.file_state == FileCreateState::Pending {
                    self.records
                        .mark_render_failed(id, err.to_string(), now)
                        .await?;
                }
                Err(err)
            }
        }
    }

    async fn load_templates(&self) -> Result<Templates, RenderError> {
        let html_name = &self.options.render.html_template;
        let html = self.read_template(html_name).await?;
        let html = Template::from_bytes(html_name, &html)?;
        let excel = self.read_template(&self.options.render.excel_template).await?;
        Ok(Templates { html, excel })
    }

    async fn read_template(&self, name: &str) -> Result<Vec<u8>, RenderError> {
        let key = join_key(&[&self.options.template_prefix, name]);
        match self.storage.read(&key).await {
            Ok(bytes) => Ok(bytes),
            Err(StorageError::NotFound { .. }) => Err(TemplateError::Missing(key).into()),
            Err(err) => Err(err.into()),
        }
    }

    async fn render_with(
        &self,
        record: &BillRecord,
        templates: &Templates,
        now: DateTime<Utc>,
    ) -> Result<RenderedArtifacts, RenderError> {
        record.file_state.transition(FileCreateState::Created)?;

        let parsed = parse_bundle(&record.bundle)?;
        let profile = resolve_profile(
            self.profiles.as_ref(),
            &record.business_id,
            self.options.render.missing_profile,
        )
        .await?;
        let today = now.with_timezone(&self.options.timezone).date_naive();
        let context = RenderContext::build(&parsed.raw, &parsed.bundle, &profile, today);

        let html = render_statement(&templates.html, &context, &profile)?;

        let mut book = read_workbook(&templates.excel)?;
        let totals = {
            let mut sheet = first_sheet(&mut book)?;
            self.excel.fill(&mut sheet, &context, &parsed.bundle, &profile)
        };
        let xlsx = write_workbook(&book)?;

        let artifacts = self.artifact_names(record, now);
        self.storage
            .write(&artifacts.html.key(), html.into_bytes())
            .await?;
        self.storage.write(&artifacts.excel.key(), xlsx).await?;
        self.records
            .save_rendered(record.id, artifacts.clone(), now)
            .await?;

        debug!(
            record_id = %record.id,
            rows = totals.rows,
            stamps_removed = totals.stamps_removed,
            "ledger filled"
        );
        Ok(artifacts)
    }

    fn artifact_names(&self, record: &BillRecord, now: DateTime<Utc>) -> RenderedArtifacts {
        let business_id = sanitize_filename(&record.business_id);
        let storage_path = join_key(&[
            &self.options.output_prefix,
            &business_id,
            &sanitize_filename(&record.bill_period),
        ]);
        let stamp = now.format("%Y%m%d%H%M%S%9f");
        let artifact = |display_suffix: &str, extension: &str| RenderedArtifact {
            display_name: format!(
                "{}_{}_{display_suffix}.{extension}",
                record.customer_name, record.bill_period
            ),
            storage_name: format!("{business_id}_{}_{stamp}.{extension}", record.id),
            storage_path: storage_path.clone(),
        };
        RenderedArtifacts {
            html: artifact("statement", "html"),
            excel: artifact("ledger", "xlsx"),
        }
    }
}
