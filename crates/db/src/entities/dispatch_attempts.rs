//! `SeaORM` Entity for dispatch_attempts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dispatch_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub record_id: i64,
    pub outcome: String,
    #[sea_orm(column_type = "Text")]
    pub detail: String,
    pub response_code: Option<String>,
    pub response_key: Option<String>,
    pub manual: bool,
    pub attempted_at: DateTimeWithTimeZone,
    pub attempted_on: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bill_records::Entity",
        from = "Column::RecordId",
        to = "super::bill_records::Column::Id"
    )]
    BillRecords,
}

impl Related<super::bill_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
