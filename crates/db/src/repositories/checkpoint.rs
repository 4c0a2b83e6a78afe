//! Batch checkpoint repository.

use billflow_core::record::{CheckpointStore, RecordError};
use billflow_shared::types::BillRecordId;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::batch_checkpoints;

/// Checkpoint repository keyed by batch stage name.
#[derive(Debug, Clone)]
pub struct CheckpointRepository {
    db: DatabaseConnection,
}

impl CheckpointRepository {
    /// Create a new checkpoint repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl CheckpointStore for CheckpointRepository {
    async fn load(&self, stage: &str) -> Result<Option<BillRecordId>, RecordError> {
        let model = batch_checkpoints::Entity::find_by_id(stage.to_string())
            .one(&self.db)
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(model.map(|m| BillRecordId(m.last_id)))
    }

    async fn save(&self, stage: &str, last_id: BillRecordId) -> Result<(), RecordError> {
        let checkpoint = batch_checkpoints::ActiveModel {
            stage: Set(stage.to_string()),
            last_id: Set(last_id.0),
            updated_at: Set(Utc::now().into()),
        };

        batch_checkpoints::Entity::insert(checkpoint)
            .on_conflict(
                OnConflict::column(batch_checkpoints::Column::Stage)
                    .update_columns([
                        batch_checkpoints::Column::LastId,
                        batch_checkpoints::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self, stage: &str) -> Result<(), RecordError> {
        batch_checkpoints::Entity::delete_by_id(stage.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(())
    }
}
