//! Billing pipeline schema.
//!
//! Creates the bill record store, the dispatch log, batch checkpoints and
//! per-business visibility profiles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(BILLING_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS dispatch_attempts, bill_records, batch_checkpoints, visibility_profiles CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const BILLING_SQL: &str = r"
-- One row per enrolled customer statement
CREATE TABLE bill_records (
    id BIGSERIAL PRIMARY KEY,
    business_id VARCHAR(10) NOT NULL,
    customer_name VARCHAR(200) NOT NULL,
    customer_code VARCHAR(20) NOT NULL,
    group_no VARCHAR(20),
    order_no VARCHAR(20),
    fixed_day INTEGER NOT NULL CHECK (fixed_day BETWEEN 1 AND 31),
    email VARCHAR(320),
    email_cc VARCHAR(320),
    bill_period CHAR(6) NOT NULL,
    bundle TEXT NOT NULL,
    send_auto CHAR(1) NOT NULL DEFAULT 'Y' CHECK (send_auto IN ('Y', 'N')),
    file_create_flag CHAR(1) NOT NULL DEFAULT 'N' CHECK (file_create_flag IN ('N', 'Y', 'E')),
    mail_send_flag CHAR(1) NOT NULL DEFAULT 'N' CHECK (mail_send_flag IN ('N', 'Y')),
    del_flag CHAR(1) NOT NULL DEFAULT 'N' CHECK (del_flag IN ('Y', 'N')),
    html_display_name VARCHAR(255),
    html_storage_name VARCHAR(255),
    html_storage_path VARCHAR(500),
    excel_display_name VARCHAR(255),
    excel_storage_name VARCHAR(255),
    excel_storage_path VARCHAR(500),
    response_code VARCHAR(20),
    response_message TEXT,
    response_key VARCHAR(100),
    dispatch_attempts INTEGER NOT NULL DEFAULT 0,
    render_error TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    file_created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    mail_sent_at TIMESTAMPTZ
);

-- Duplicate probe at enrollment
CREATE INDEX idx_bill_records_customer ON bill_records(business_id, customer_code) WHERE del_flag = 'N';

-- Render batch scan
CREATE INDEX idx_bill_records_pending_render ON bill_records(id) WHERE file_create_flag = 'N' AND del_flag = 'N';

-- Daily dispatch selection
CREATE INDEX idx_bill_records_dispatch ON bill_records(fixed_day, id)
    WHERE send_auto = 'Y' AND file_create_flag = 'Y' AND mail_send_flag = 'N' AND del_flag = 'N';

-- Append-only dispatch log
CREATE TABLE dispatch_attempts (
    id BIGSERIAL PRIMARY KEY,
    record_id BIGINT NOT NULL REFERENCES bill_records(id) ON DELETE CASCADE,
    outcome VARCHAR(10) NOT NULL,
    detail TEXT NOT NULL,
    response_code VARCHAR(20),
    response_key VARCHAR(100),
    manual BOOLEAN NOT NULL DEFAULT FALSE,
    attempted_at TIMESTAMPTZ NOT NULL,
    attempted_on DATE NOT NULL
);

-- Same-day guard lookup
CREATE INDEX idx_dispatch_attempts_day ON dispatch_attempts(record_id, attempted_on, outcome);

-- Resume cursor per batch stage
CREATE TABLE batch_checkpoints (
    stage VARCHAR(50) PRIMARY KEY,
    last_id BIGINT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Per-business template visibility
CREATE TABLE visibility_profiles (
    business_id VARCHAR(10) PRIMARY KEY,
    column_flags JSONB NOT NULL DEFAULT '{}'::jsonb,
    show_stamp BOOLEAN NOT NULL DEFAULT TRUE,
    show_type_summary BOOLEAN NOT NULL DEFAULT TRUE,
    show_notice BOOLEAN NOT NULL DEFAULT TRUE,
    show_bank_account BOOLEAN NOT NULL DEFAULT TRUE,
    show_contact BOOLEAN NOT NULL DEFAULT TRUE,
    notice_text TEXT NOT NULL DEFAULT '',
    bank_account_text TEXT NOT NULL DEFAULT '',
    contact_text TEXT NOT NULL DEFAULT '',
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";
