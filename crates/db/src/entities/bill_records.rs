//! `SeaORM` Entity for bill_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bill_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub business_id: String,
    pub customer_name: String,
    pub customer_code: String,
    pub group_no: Option<String>,
    pub order_no: Option<String>,
    pub fixed_day: i32,
    pub email: Option<String>,
    pub email_cc: Option<String>,
    pub bill_period: String,
    #[sea_orm(column_type = "Text")]
    pub bundle: String,
    pub send_auto: String,
    pub file_create_flag: String,
    pub mail_send_flag: String,
    pub del_flag: String,
    pub html_display_name: Option<String>,
    pub html_storage_name: Option<String>,
    pub html_storage_path: Option<String>,
    pub excel_display_name: Option<String>,
    pub excel_storage_name: Option<String>,
    pub excel_storage_path: Option<String>,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub response_key: Option<String>,
    pub dispatch_attempts: i32,
    pub render_error: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub file_created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: DateTimeWithTimeZone,
    pub mail_sent_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dispatch_attempts::Entity")]
    DispatchAttempts,
}

impl Related<super::dispatch_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DispatchAttempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
