//! `SeaORM` Entity for visibility_profiles table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "visibility_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub business_id: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub column_flags: Json,
    pub show_stamp: bool,
    pub show_type_summary: bool,
    pub show_notice: bool,
    pub show_bank_account: bool,
    pub show_contact: bool,
    #[sea_orm(column_type = "Text")]
    pub notice_text: String,
    #[sea_orm(column_type = "Text")]
    pub bank_account_text: String,
    #[sea_orm(column_type = "Text")]
    pub contact_text: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
