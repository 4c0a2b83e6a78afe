//! Bill record repository for database operations.
//!
//! Implements the core record store using SeaORM. Soft-deleted rows
//! (`del_flag = 'Y'`) are invisible to every query here.

use billflow_core::erp::CorrelationKey;
use billflow_core::record::{
    AttemptOutcome, BillRecord, BillRecordRepository as BillRecordRepoTrait, DispatchAttempt,
    DuplicateProbe, FileCreateState, GatewayResponse, MailSendState, NewBillRecord, RecordError,
    RenderedArtifact, RenderedArtifacts, flag_code, parse_flag,
};
use billflow_shared::types::BillRecordId;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::{bill_records, dispatch_attempts};

/// Outcome label of a successful send in the dispatch log.
const SENT_OUTCOME: &str = "SENT";

/// Bill record repository implementation.
#[derive(Debug, Clone)]
pub struct BillRecordRepository {
    db: DatabaseConnection,
}

impl BillRecordRepository {
    /// Create a new bill record repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_live<C: sea_orm::ConnectionTrait>(
        conn: &C,
        id: BillRecordId,
    ) -> Result<bill_records::Model, RecordError> {
        live()
            .filter(bill_records::Column::Id.eq(id.0))
            .one(conn)
            .await
            .map_err(database)?
            .ok_or(RecordError::NotFound(id))
    }
}

impl BillRecordRepoTrait for BillRecordRepository {
    async fn find_active_duplicate(
        &self,
        probe: &DuplicateProbe,
    ) -> Result<Option<BillRecordId>, RecordError> {
        let model = duplicate_query(probe)
            .order_by_asc(bill_records::Column::Id)
            .one(&self.db)
            .await
            .map_err(database)?;

        Ok(model.map(|m| BillRecordId(m.id)))
    }

    async fn insert(&self, record: NewBillRecord) -> Result<BillRecordId, RecordError> {
        let fixed_day = i32::try_from(record.fixed_day)
            .map_err(|_| RecordError::Database(format!("fixed day {} out of range", record.fixed_day)))?;

        let active_model = bill_records::ActiveModel {
            business_id: Set(record.business_id),
            customer_name: Set(record.customer_name),
            customer_code: Set(record.customer_code),
            group_no: Set(record.group_no),
            order_no: Set(record.order_no),
            fixed_day: Set(fixed_day),
            email: Set(record.email),
            email_cc: Set(record.email_cc),
            bill_period: Set(record.bill_period),
            bundle: Set(record.bundle),
            send_auto: Set(flag_code(record.send_auto).to_string()),
            file_create_flag: Set(record.file_state.code().to_string()),
            mail_send_flag: Set(record.mail_state.code().to_string()),
            del_flag: Set(flag_code(record.deleted).to_string()),
            dispatch_attempts: Set(0),
            created_at: Set(record.created_at.into()),
            updated_at: Set(record.updated_at.into()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(database)?;
        Ok(BillRecordId(model.id))
    }

    async fn find_by_id(&self, id: BillRecordId) -> Result<Option<BillRecord>, RecordError> {
        let model = live()
            .filter(bill_records::Column::Id.eq(id.0))
            .one(&self.db)
            .await
            .map_err(database)?;

        model.map(to_domain).transpose()
    }

    async fn list_pending_render(
        &self,
        after: Option<BillRecordId>,
        limit: u64,
    ) -> Result<Vec<BillRecord>, RecordError> {
        let mut query = live()
            .filter(bill_records::Column::FileCreateFlag.eq(FileCreateState::Pending.code()));
        if let Some(after) = after {
            query = query.filter(bill_records::Column::Id.gt(after.0));
        }

        let models = query
            .order_by_asc(bill_records::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(database)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn save_rendered(
        &self,
        id: BillRecordId,
        artifacts: RenderedArtifacts,
        at: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        let model = Self::load_live(&self.db, id).await?;
        let current = file_state(&model)?;
        let next = current.transition(FileCreateState::Created)?;

        let mut active: bill_records::ActiveModel = model.into();
        active.file_create_flag = Set(next.code().to_string());
        active.html_display_name = Set(Some(artifacts.html.display_name));
        active.html_storage_name = Set(Some(artifacts.html.storage_name));
        active.html_storage_path = Set(Some(artifacts.html.storage_path));
        active.excel_display_name = Set(Some(artifacts.excel.display_name));
        active.excel_storage_name = Set(Some(artifacts.excel.storage_name));
        active.excel_storage_path = Set(Some(artifacts.excel.storage_path));
        active.render_error = Set(None);
        active.file_created_at = Set(Some(at.into()));
        active.updated_at = Set(at.into());
        active.update(&self.db).await.map_err(database)?;

        debug!(record_id = %id, "rendered artifacts stored");
        Ok(())
    }

    async fn mark_render_failed(
        &self,
        id: BillRecordId,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        let model = Self::load_live(&self.db, id).await?;
        let next = file_state(&model)?.transition(FileCreateState::Failed)?;

        let mut active: bill_records::ActiveModel = model.into();
        active.file_create_flag = Set(next.code().to_string());
        active.render_error = Set(Some(reason));
        active.updated_at = Set(at.into());
        active.update(&self.db).await.map_err(database)?;
        Ok(())
    }

    async fn list_dispatch_candidates(&self, day: u32) -> Result<Vec<BillRecord>, RecordError> {
        let day = i32::try_from(day)
            .map_err(|_| RecordError::Database(format!("dispatch day {day} out of range")))?;

        let models = live()
            .filter(bill_records::Column::SendAuto.eq(flag_code(true)))
            .filter(bill_records::Column::FileCreateFlag.eq(FileCreateState::Created.code()))
            .filter(bill_records::Column::MailSendFlag.eq(MailSendState::Pending.code()))
            .filter(bill_records::Column::FixedDay.eq(day))
            .order_by_asc(bill_records::Column::Id)
            .all(&self.db)
            .await
            .map_err(database)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn record_dispatch_attempt(&self, attempt: DispatchAttempt) -> Result<(), RecordError> {
        let txn = self.db.begin().await.map_err(database)?;

        let model = Self::load_live(&txn, attempt.record_id).await?;
        let mail_state = mail_state(&model)?;

        let response = attempt.outcome.response().cloned();
        dispatch_attempts::ActiveModel {
            record_id: Set(attempt.record_id.0),
            outcome: Set(attempt.outcome.label().to_string()),
            detail: Set(attempt.outcome.detail()),
            response_code: Set(response.as_ref().map(|r| r.code.clone())),
            response_key: Set(response.as_ref().map(|r| r.key.clone())),
            manual: Set(attempt.manual),
            attempted_at: Set(attempt.attempted_at.into()),
            attempted_on: Set(attempt.attempted_on),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(database)?;

        let attempts = model.dispatch_attempts.saturating_add(1);
        let mut active: bill_records::ActiveModel = model.into();
        active.dispatch_attempts = Set(attempts);
        if let Some(response) = response {
            active.response_code = Set(Some(response.code));
            active.response_message = Set(Some(response.message));
            active.response_key = Set(Some(response.key));
        }
        if attempt.outcome.is_success() {
            // A manual resend of an already sent record keeps the flag as is.
            if mail_state == MailSendState::Pending {
                let next = mail_state.transition(MailSendState::Sent)?;
                active.mail_send_flag = Set(next.code().to_string());
            }
            active.mail_sent_at = Set(Some(attempt.attempted_at.into()));
        }
        active.updated_at = Set(attempt.attempted_at.into());
        active.update(&txn).await.map_err(database)?;

        txn.commit().await.map_err(database)?;

        debug!(
            record_id = %attempt.record_id,
            outcome = attempt.outcome.label(),
            "dispatch attempt recorded"
        );
        Ok(())
    }

    async fn has_successful_send_on(
        &self,
        id: BillRecordId,
        date: NaiveDate,
    ) -> Result<bool, RecordError> {
        let count: u64 = dispatch_attempts::Entity::find()
            .filter(dispatch_attempts::Column::RecordId.eq(id.0))
            .filter(dispatch_attempts::Column::AttemptedOn.eq(date))
            .filter(dispatch_attempts::Column::Outcome.eq(SENT_OUTCOME))
            .count(&self.db)
            .await
            .map_err(database)?;

        Ok(count > 0)
    }
}

/// Base query over live records.
fn live() -> Select<bill_records::Entity> {
    bill_records::Entity::find().filter(bill_records::Column::DelFlag.eq(flag_code(false)))
}

/// Live rows of the same customer sharing the probe's correlation key.
///
/// Only the column the key was selected from is compared.
fn duplicate_query(probe: &DuplicateProbe) -> Select<bill_records::Entity> {
    let correlation = match &probe.key {
        CorrelationKey::Group(group_no) => bill_records::Column::GroupNo.eq(group_no.as_str()),
        CorrelationKey::Order(order_no) => bill_records::Column::OrderNo.eq(order_no.as_str()),
    };
    live()
        .filter(bill_records::Column::BusinessId.eq(probe.business_id.as_str()))
        .filter(bill_records::Column::CustomerCode.eq(probe.customer_code.as_str()))
        .filter(correlation)
}

fn database(e: DbErr) -> RecordError {
    RecordError::Database(e.to_string())
}

fn file_state(model: &bill_records::Model) -> Result<FileCreateState, RecordError> {
    FileCreateState::parse(&model.file_create_flag).ok_or_else(|| RecordError::Corrupt {
        id: BillRecordId(model.id),
        reason: format!("unknown file create flag {:?}", model.file_create_flag),
    })
}

fn mail_state(model: &bill_records::Model) -> Result<MailSendState, RecordError> {
    MailSendState::parse(&model.mail_send_flag).ok_or_else(|| RecordError::Corrupt {
        id: BillRecordId(model.id),
        reason: format!("unknown mail send flag {:?}", model.mail_send_flag),
    })
}

/// Artifact columns count only when all three are present.
fn artifact(
    display_name: Option<String>,
    storage_name: Option<String>,
    storage_path: Option<String>,
) -> Option<RenderedArtifact> {
    Some(RenderedArtifact {
        display_name: display_name?,
        storage_name: storage_name?,
        storage_path: storage_path?,
    })
}

/// Convert database model to domain record.
fn to_domain(model: bill_records::Model) -> Result<BillRecord, RecordError> {
    let id = BillRecordId(model.id);
    let file_state = file_state(&model)?;
    let mail_state = mail_state(&model)?;
    let fixed_day = u32::try_from(model.fixed_day).map_err(|_| RecordError::Corrupt {
        id,
        reason: format!("negative fixed day {}", model.fixed_day),
    })?;
    let dispatch_attempts = u32::try_from(model.dispatch_attempts).unwrap_or_default();

    let last_response = model.response_code.map(|code| GatewayResponse {
        code,
        message: model.response_message.unwrap_or_default(),
        key: model.response_key.unwrap_or_default(),
    });

    Ok(BillRecord {
        id,
        business_id: model.business_id,
        customer_name: model.customer_name,
        customer_code: model.customer_code,
        group_no: model.group_no,
        order_no: model.order_no,
        fixed_day,
        email: model.email,
        email_cc: model.email_cc,
        bill_period: model.bill_period,
        bundle: model.bundle,
        send_auto: parse_flag(&model.send_auto),
        file_state,
        mail_state,
        deleted: parse_flag(&model.del_flag),
        html: artifact(
            model.html_display_name,
            model.html_storage_name,
            model.html_storage_path,
        ),
        excel: artifact(
            model.excel_display_name,
            model.excel_storage_name,
            model.excel_storage_path,
        ),
        last_response,
        dispatch_attempts,
        render_error: model.render_error,
        created_at: model.created_at.with_timezone(&Utc),
        file_created_at: model.file_created_at.map(|t| t.with_timezone(&Utc)),
        updated_at: model.updated_at.with_timezone(&Utc),
        mail_sent_at: model.mail_sent_at.map(|t| t.with_timezone(&Utc)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, Value};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 1, 0, 0).unwrap()
    }

    fn row(id: i64) -> bill_records::Model {
        bill_records::Model {
            id,
            business_id: "1234567890".to_string(),
            customer_name: "Acme".to_string(),
            customer_code: "C001".to_string(),
            group_no: Some("G-1".to_string()),
            order_no: Some("O-1".to_string()),
            fixed_day: 1,
            email: Some("billing@acme.test".to_string()),
            email_cc: None,
            bill_period: "202508".to_string(),
            bundle: "{}".to_string(),
            send_auto: "Y".to_string(),
            file_create_flag: "N".to_string(),
            mail_send_flag: "N".to_string(),
            del_flag: "N".to_string(),
            html_display_name: None,
            html_storage_name: None,
            html_storage_path: None,
            excel_display_name: None,
            excel_storage_name: None,
            excel_storage_path: None,
            response_code: None,
            response_message: None,
            response_key: None,
            dispatch_attempts: 0,
            render_error: None,
            created_at: now().into(),
            file_created_at: None,
            updated_at: now().into(),
            mail_sent_at: None,
        }
    }

    fn rendered_row(id: i64) -> bill_records::Model {
        bill_records::Model {
            file_create_flag: "Y".to_string(),
            html_display_name: Some("Acme_202508_statement.html".to_string()),
            html_storage_name: Some("1234567890_1_20250901100000.html".to_string()),
            html_storage_path: Some("statements/1234567890/202508".to_string()),
            ..row(id)
        }
    }

    fn attempt_row(record_id: i64) -> dispatch_attempts::Model {
        dispatch_attempts::Model {
            id: 1,
            record_id,
            outcome: SENT_OUTCOME.to_string(),
            detail: "200: ok".to_string(),
            response_code: Some("200".to_string()),
            response_key: Some("msg-1".to_string()),
            manual: false,
            attempted_at: now().into(),
            attempted_on: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        }
    }

    fn repo(db: MockDatabase) -> BillRecordRepository {
        BillRecordRepository::new(db.into_connection())
    }

    fn postgres() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[test]
    fn test_sent_outcome_matches_core_label() {
        let outcome = AttemptOutcome::Delivered(GatewayResponse::default());
        assert_eq!(outcome.label(), SENT_OUTCOME);
    }

    #[test]
    fn test_to_domain_decodes_flags_and_artifacts() {
        let record = to_domain(rendered_row(7)).unwrap();

        assert_eq!(record.id, BillRecordId(7));
        assert_eq!(record.file_state, FileCreateState::Created);
        assert_eq!(record.mail_state, MailSendState::Pending);
        assert!(record.send_auto);
        assert!(!record.deleted);
        assert_eq!(
            record.html.unwrap().key(),
            "statements/1234567890/202508/1234567890_1_20250901100000.html"
        );
        assert!(record.excel.is_none());
        assert_eq!(record.created_at, now());
    }

    #[test]
    fn test_to_domain_keeps_gateway_response() {
        let model = bill_records::Model {
            response_code: Some("E42".to_string()),
            response_message: None,
            response_key: Some("msg-9".to_string()),
            ..row(1)
        };

        let response = to_domain(model).unwrap().last_response.unwrap();

        assert_eq!(response.code, "E42");
        assert_eq!(response.message, "");
        assert_eq!(response.key, "msg-9");
    }

    #[rstest]
    #[case("X", "N")]
    #[case("Y", "?")]
    #[case("", "N")]
    fn test_unknown_flag_is_corrupt(#[case] file_flag: &str, #[case] mail_flag: &str) {
        let model = bill_records::Model {
            file_create_flag: file_flag.to_string(),
            mail_send_flag: mail_flag.to_string(),
            ..row(3)
        };

        let err = to_domain(model).unwrap_err();

        assert!(matches!(err, RecordError::Corrupt { id, .. } if id == BillRecordId(3)));
    }

    #[test]
    fn test_partial_artifact_columns_are_ignored() {
        let model = bill_records::Model {
            html_storage_path: None,
            ..rendered_row(1)
        };

        assert!(to_domain(model).unwrap().html.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_returns_decoded_record() {
        let repo = repo(postgres().append_query_results([vec![rendered_row(1)]]));

        let record = repo.find_by_id(BillRecordId(1)).await.unwrap().unwrap();

        assert_eq!(record.customer_name, "Acme");
        assert_eq!(record.file_state, FileCreateState::Created);
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let repo = repo(postgres().append_query_results([Vec::<bill_records::Model>::new()]));

        assert!(repo.find_by_id(BillRecordId(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_returns_generated_id() {
        let repo = repo(postgres().append_query_results([vec![row(42)]]));
        let record = NewBillRecord {
            business_id: "1234567890".to_string(),
            customer_name: "Acme".to_string(),
            customer_code: "C001".to_string(),
            group_no: Some("G-1".to_string()),
            order_no: None,
            fixed_day: 1,
            email: None,
            email_cc: None,
            bill_period: "202508".to_string(),
            bundle: "{}".to_string(),
            send_auto: true,
            file_state: FileCreateState::Pending,
            mail_state: MailSendState::Pending,
            deleted: false,
            created_at: now(),
            updated_at: now(),
        };

        assert_eq!(repo.insert(record).await.unwrap(), BillRecordId(42));
    }

    fn probe(key: CorrelationKey) -> DuplicateProbe {
        DuplicateProbe {
            business_id: "1234567890".to_string(),
            customer_code: "C001".to_string(),
            key,
        }
    }

    #[rstest]
    #[case(CorrelationKey::Order("O-2".to_string()), r#""order_no" = 'O-2'"#, r#""group_no" ="#)]
    #[case(CorrelationKey::Group("G-1".to_string()), r#""group_no" = 'G-1'"#, r#""order_no" ="#)]
    fn test_duplicate_query_compares_only_the_key_column(
        #[case] key: CorrelationKey,
        #[case] expected: &str,
        #[case] absent: &str,
    ) {
        let sql = duplicate_query(&probe(key))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(expected), "{sql}");
        assert!(!sql.contains(absent), "{sql}");
    }

    #[tokio::test]
    async fn test_duplicate_probe_returns_match() {
        let repo = repo(postgres().append_query_results([vec![row(5)]]));

        assert_eq!(
            repo.find_active_duplicate(&probe(CorrelationKey::Order("O-1".to_string())))
                .await
                .unwrap(),
            Some(BillRecordId(5))
        );
    }

    #[tokio::test]
    async fn test_duplicate_probe_without_match_is_none() {
        let repo = repo(postgres().append_query_results([Vec::<bill_records::Model>::new()]));

        assert_eq!(
            repo.find_active_duplicate(&probe(CorrelationKey::Order("O-2".to_string())))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_list_pending_render_decodes_rows() {
        let repo = repo(postgres().append_query_results([vec![row(3), row(4)]]));

        let records = repo
            .list_pending_render(Some(BillRecordId(2)), 100)
            .await
            .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![BillRecordId(3), BillRecordId(4)]);
    }

    #[tokio::test]
    async fn test_save_rendered_rejects_failed_record() {
        let failed = bill_records::Model {
            file_create_flag: "E".to_string(),
            ..row(1)
        };
        let repo = repo(postgres().append_query_results([vec![failed]]));
        let artifact = RenderedArtifact {
            display_name: "a.html".to_string(),
            storage_name: "b.html".to_string(),
            storage_path: "statements".to_string(),
        };

        let err = repo
            .save_rendered(
                BillRecordId(1),
                RenderedArtifacts {
                    html: artifact.clone(),
                    excel: artifact,
                },
                now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RecordError::InvalidFileTransition {
                from: FileCreateState::Failed,
                to: FileCreateState::Created
            }
        ));
    }

    #[tokio::test]
    async fn test_mark_render_failed_unknown_record_is_not_found() {
        let repo = repo(postgres().append_query_results([Vec::<bill_records::Model>::new()]));

        let err = repo
            .mark_render_failed(BillRecordId(8), "bad stcd2".to_string(), now())
            .await
            .unwrap_err();

        assert_eq!(err, RecordError::NotFound(BillRecordId(8)));
    }

    #[tokio::test]
    async fn test_record_successful_attempt() {
        let sent = bill_records::Model {
            mail_send_flag: "Y".to_string(),
            dispatch_attempts: 1,
            ..rendered_row(1)
        };
        let repo = repo(
            postgres()
                .append_query_results([vec![rendered_row(1)]])
                .append_query_results([vec![attempt_row(1)]])
                .append_query_results([vec![sent]]),
        );
        let attempt = DispatchAttempt {
            record_id: BillRecordId(1),
            outcome: AttemptOutcome::Delivered(GatewayResponse {
                code: "200".to_string(),
                message: "ok".to_string(),
                key: "msg-1".to_string(),
            }),
            manual: false,
            attempted_at: now(),
            attempted_on: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        };

        repo.record_dispatch_attempt(attempt).await.unwrap();
    }

    #[rstest]
    #[case(1, true)]
    #[case(0, false)]
    #[tokio::test]
    async fn test_has_successful_send_on(#[case] count: i64, #[case] expected: bool) {
        let repo = repo(postgres().append_query_results([vec![BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(count)),
        )])]]));

        let sent = repo
            .has_successful_send_on(BillRecordId(1), NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(sent, expected);
    }
}
