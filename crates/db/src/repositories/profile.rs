//! Template visibility profile repository.

use std::collections::BTreeMap;

use billflow_core::bundle::LedgerColumn;
use billflow_core::profile::{ProfileError, ProfileStore, TemplateVisibilityProfile};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::entities::visibility_profiles;

/// Read-only profile repository.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ProfileStore for ProfileRepository {
    async fn get_profile(
        &self,
        business_id: &str,
    ) -> Result<Option<TemplateVisibilityProfile>, ProfileError> {
        let model = visibility_profiles::Entity::find_by_id(business_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ProfileError::Store(e.to_string()))?;

        model.map(to_domain).transpose()
    }
}

/// Convert database model to domain profile.
///
/// `column_flags` holds a JSON object keyed by ledger column name.
fn to_domain(model: visibility_profiles::Model) -> Result<TemplateVisibilityProfile, ProfileError> {
    let columns: BTreeMap<LedgerColumn, bool> = serde_json::from_value(model.column_flags)
        .map_err(|e| {
            ProfileError::Store(format!(
                "invalid column flags for business {}: {e}",
                model.business_id
            ))
        })?;

    Ok(TemplateVisibilityProfile {
        business_id: model.business_id,
        columns,
        show_stamp: model.show_stamp,
        show_type_summary: model.show_type_summary,
        show_notice: model.show_notice,
        show_bank_account: model.show_bank_account,
        show_contact: model.show_contact,
        notice_text: model.notice_text,
        bank_account_text: model.bank_account_text,
        contact_text: model.contact_text,
    })
}
