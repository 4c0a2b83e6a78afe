//! Persistence traits for bill records and batch checkpoints.
//!
//! These traits are implemented by the db crate. Every query path excludes
//! soft-deleted records.

use billflow_shared::types::BillRecordId;
use chrono::{DateTime, NaiveDate, Utc};

use super::error::RecordError;
use super::types::{BillRecord, DispatchAttempt, DuplicateProbe, NewBillRecord, RenderedArtifacts};

/// Repository trait for bill record persistence.
pub trait BillRecordRepository: Send + Sync {
    /// Find a live record matching the probe.
    fn find_active_duplicate(
        &self,
        probe: &DuplicateProbe,
    ) -> impl std::future::Future<Output = Result<Option<BillRecordId>, RecordError>> + Send;

    /// Insert a new record and return its id.
    fn insert(
        &self,
        record: NewBillRecord,
    ) -> impl std::future::Future<Output = Result<BillRecordId, RecordError>> + Send;

    /// Find a live record by id.
    fn find_by_id(
        &self,
        id: BillRecordId,
    ) -> impl std::future::Future<Output = Result<Option<BillRecord>, RecordError>> + Send;

    /// List records with `fileCreateFlag=N`, ordered by id, strictly after `after`.
    fn list_pending_render(
        &self,
        after: Option<BillRecordId>,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<BillRecord>, RecordError>> + Send;

    /// Store rendered artifact references and set `fileCreateFlag=Y`.
    fn save_rendered(
        &self,
        id: BillRecordId,
        artifacts: RenderedArtifacts,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;

    /// Set `fileCreateFlag=E` and keep the failure reason.
    fn mark_render_failed(
        &self,
        id: BillRecordId,
        reason: String,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;

    /// Automated candidates:
    /// `sendAuto=Y AND fileCreateFlag=Y AND mailSendFlag=N AND fixedDay=day`.
    fn list_dispatch_candidates(
        &self,
        day: u32,
    ) -> impl std::future::Future<Output = Result<Vec<BillRecord>, RecordError>> + Send;

    /// Append a dispatch attempt and apply its outcome to the record.
    ///
    /// Every attempt increments the attempt counter. A gateway response is
    /// always stored on the record; `mailSendFlag` flips to `Y` and the sent
    /// timestamp is stamped only on success.
    fn record_dispatch_attempt(
        &self,
        attempt: DispatchAttempt,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;

    /// Returns true if the dispatch log holds a successful send on `date`.
    fn has_successful_send_on(
        &self,
        id: BillRecordId,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<bool, RecordError>> + Send;
}

/// Persistent cursor of the last processed record per batch stage.
pub trait CheckpointStore: Send + Sync {
    /// Load the cursor for a stage.
    fn load(
        &self,
        stage: &str,
    ) -> impl std::future::Future<Output = Result<Option<BillRecordId>, RecordError>> + Send;

    /// Persist the cursor for a stage.
    fn save(
        &self,
        stage: &str,
        last_id: BillRecordId,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;

    /// Clear the cursor after a completed run.
    fn clear(
        &self,
        stage: &str,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;
}
