//! In-memory fakes shared by the scenario tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Instant;

use billflow_shared::types::BillRecordId;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use crate::bundle::{BillDataBundle, BillingSummary, CustomerProfile, LineItem, TypeSummary};
use crate::dispatch::{GatewayError, NotificationGateway, NotificationRequest};
use crate::erp::{ErpError, ErpQuery, ErpSource, EnrollmentCandidate};
use crate::profile::{ProfileError, ProfileStore, TemplateVisibilityProfile};
use crate::record::{
    BillRecord, BillRecordRepository, CheckpointStore, DispatchAttempt, DuplicateProbe,
    FileCreateState, GatewayResponse, MailSendState, NewBillRecord, RecordError,
    RenderedArtifacts,
};

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 1, 0, 0).unwrap()
}

pub(crate) fn sample_bundle() -> BillDataBundle {
    let item = |bill_date: &str, supply| LineItem {
        bill_date: bill_date.to_string(),
        bill_type: "01".to_string(),
        bill_type_name: "Rental".to_string(),
        contract_no: "C-1".to_string(),
        order_no: "O-1".to_string(),
        product_name: "Water purifier".to_string(),
        quantity: "1".to_string(),
        unit_price: supply,
        supply_amount: supply,
        tax_amount: supply / dec!(10),
        ..LineItem::default()
    };
    BillDataBundle {
        customer: CustomerProfile {
            stcd2: "1234567890".to_string(),
            kunnr: "C001".to_string(),
            name1: "Acme".to_string(),
            j1kfrepre: "Kim".to_string(),
            stras: "1 Main St".to_string(),
            telf1: "02-000-0000".to_string(),
        },
        summary: BillingSummary {
            bill_period: "202508".to_string(),
            total_amount: dec!(33000),
            supply_amount: dec!(30000),
            tax_amount: dec!(3000),
            unpaid_amount: dec!(0),
            due_date: "20250825".to_string(),
            sel_count: 2,
        },
        type_summary: vec![TypeSummary {
            bill_type: "01".to_string(),
            bill_type_name: "Rental".to_string(),
            count: 2,
            amount: dec!(33000),
        }],
        items: vec![item("20250801", dec!(10000)), item("20250815", dec!(20000))],
    }
}

pub(crate) fn sample_record(id: i64) -> BillRecord {
    BillRecord {
        id: BillRecordId(id),
        business_id: "1234567890".to_string(),
        customer_name: "Acme".to_string(),
        customer_code: "C001".to_string(),
        group_no: Some("G-1".to_string()),
        order_no: Some("O-1".to_string()),
        fixed_day: 1,
        email: Some("billing@acme.test".to_string()),
        email_cc: None,
        bill_period: "202508".to_string(),
        bundle: sample_bundle().to_json().unwrap(),
        send_auto: true,
        file_state: FileCreateState::Pending,
        mail_state: MailSendState::Pending,
        deleted: false,
        html: None,
        excel: None,
        last_response: None,
        dispatch_attempts: 0,
        render_error: None,
        created_at: fixed_now(),
        file_created_at: None,
        updated_at: fixed_now(),
        mail_sent_at: None,
    }
}

pub(crate) fn sample_candidate(customer_code: &str) -> EnrollmentCandidate {
    EnrollmentCandidate {
        business_id: "1234567890".to_string(),
        customer_code: customer_code.to_string(),
        customer_name: "Acme".to_string(),
        group_no: Some("G-1".to_string()),
        order_no: Some("O-1".to_string()),
        fixed_day: 1,
        email: Some("billing@acme.test".to_string()),
        email_cc: None,
        bill_period: "202508".to_string(),
        send_auto: true,
    }
}

/// Record store backed by a vector.
#[derive(Default)]
pub(crate) struct InMemoryRecords {
    records: Mutex<Vec<BillRecord>>,
    attempts: Mutex<Vec<DispatchAttempt>>,
}

impl InMemoryRecords {
    pub(crate) fn seed(&self, record: BillRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub(crate) fn get(&self, id: i64) -> BillRecord {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == BillRecordId(id))
            .cloned()
            .unwrap()
    }

    pub(crate) fn all(&self) -> Vec<BillRecord> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) fn attempts(&self) -> Vec<DispatchAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// Appends to the dispatch log without touching the record.
    pub(crate) fn log_only(&self, attempt: DispatchAttempt) {
        self.attempts.lock().unwrap().push(attempt);
    }

    fn update(&self, id: BillRecordId, f: impl FnOnce(&mut BillRecord)) -> Result<(), RecordError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id && !r.deleted)
            .ok_or(RecordError::NotFound(id))?;
        f(record);
        Ok(())
    }
}

impl BillRecordRepository for InMemoryRecords {
    async fn find_active_duplicate(
        &self,
        probe: &DuplicateProbe,
    ) -> Result<Option<BillRecordId>, RecordError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| probe.matches(r))
            .map(|r| r.id))
    }

    async fn insert(&self, record: NewBillRecord) -> Result<BillRecordId, RecordError> {
        let mut records = self.records.lock().unwrap();
        let id = BillRecordId(i64::try_from(records.len()).unwrap() + 1);
        records.push(BillRecord {
            id,
            business_id: record.business_id,
            customer_name: record.customer_name,
            customer_code: record.customer_code,
            group_no: record.group_no,
            order_no: record.order_no,
            fixed_day: record.fixed_day,
            email: record.email,
            email_cc: record.email_cc,
            bill_period: record.bill_period,
            bundle: record.bundle,
            send_auto: record.send_auto,
            file_state: record.file_state,
            mail_state: record.mail_state,
            deleted: record.deleted,
            html: None,
            excel: None,
            last_response: None,
            dispatch_attempts: 0,
            render_error: None,
            created_at: record.created_at,
            file_created_at: None,
            updated_at: record.updated_at,
            mail_sent_at: None,
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: BillRecordId) -> Result<Option<BillRecord>, RecordError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && !r.deleted)
            .cloned())
    }

    async fn list_pending_render(
        &self,
        after: Option<BillRecordId>,
        limit: u64,
    ) -> Result<Vec<BillRecord>, RecordError> {
        let mut page: Vec<BillRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.deleted && r.file_state == FileCreateState::Pending)
            .filter(|r| after.is_none_or(|after| r.id > after))
            .cloned()
            .collect();
        page.sort_by_key(|r| r.id);
        page.truncate(usize::try_from(limit).unwrap());
        Ok(page)
    }

    async fn save_rendered(
        &self,
        id: BillRecordId,
        artifacts: RenderedArtifacts,
        at: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        let mut result = Ok(());
        self.update(id, |r| match r.file_state.transition(FileCreateState::Created) {
            Ok(state) => {
                r.file_state = state;
                r.html = Some(artifacts.html);
                r.excel = Some(artifacts.excel);
                r.render_error = None;
                r.file_created_at = Some(at);
                r.updated_at = at;
            }
            Err(err) => result = Err(err),
        })?;
        result
    }

    async fn mark_render_failed(
        &self,
        id: BillRecordId,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        self.update(id, |r| {
            r.file_state = FileCreateState::Failed;
            r.render_error = Some(reason);
            r.updated_at = at;
        })
    }

    async fn list_dispatch_candidates(&self, day: u32) -> Result<Vec<BillRecord>, RecordError> {
        let mut candidates: Vec<BillRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_due_on(day))
            .cloned()
            .collect();
        candidates.sort_by_key(|r| r.id);
        Ok(candidates)
    }

    async fn record_dispatch_attempt(&self, attempt: DispatchAttempt) -> Result<(), RecordError> {
        self.update(attempt.record_id, |r| {
            r.dispatch_attempts += 1;
            if let Some(response) = attempt.outcome.response() {
                r.last_response = Some(response.clone());
            }
            if attempt.outcome.is_success() {
                r.mail_state = MailSendState::Sent;
                r.mail_sent_at = Some(attempt.attempted_at);
            }
            r.updated_at = attempt.attempted_at;
        })?;
        self.attempts.lock().unwrap().push(attempt);
        Ok(())
    }

    async fn has_successful_send_on(
        &self,
        id: BillRecordId,
        date: NaiveDate,
    ) -> Result<bool, RecordError> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.record_id == id && a.attempted_on == date && a.outcome.is_success()))
    }
}

/// Checkpoint store backed by a map.
#[derive(Default)]
pub(crate) struct InMemoryCheckpoints {
    cursors: Mutex<HashMap<String, BillRecordId>>,
}

impl InMemoryCheckpoints {
    pub(crate) fn current(&self, stage: &str) -> Option<BillRecordId> {
        self.cursors.lock().unwrap().get(stage).copied()
    }
}

impl CheckpointStore for InMemoryCheckpoints {
    async fn load(&self, stage: &str) -> Result<Option<BillRecordId>, RecordError> {
        Ok(self.current(stage))
    }

    async fn save(&self, stage: &str, last_id: BillRecordId) -> Result<(), RecordError> {
        self.cursors
            .lock()
            .unwrap()
            .insert(stage.to_string(), last_id);
        Ok(())
    }

    async fn clear(&self, stage: &str) -> Result<(), RecordError> {
        self.cursors.lock().unwrap().remove(stage);
        Ok(())
    }
}

/// Profile store backed by a map.
#[derive(Default)]
pub(crate) struct InMemoryProfiles {
    profiles: Mutex<HashMap<String, TemplateVisibilityProfile>>,
}

impl InMemoryProfiles {
    pub(crate) fn insert(&self, profile: TemplateVisibilityProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.business_id.clone(), profile);
    }
}

impl ProfileStore for InMemoryProfiles {
    async fn get_profile(
        &self,
        business_id: &str,
    ) -> Result<Option<TemplateVisibilityProfile>, ProfileError> {
        Ok(self.profiles.lock().unwrap().get(business_id).cloned())
    }
}

/// ERP source serving one fixed bundle.
#[derive(Default)]
pub(crate) struct FakeErp {
    pub(crate) candidates: Vec<EnrollmentCandidate>,
    /// Related-line counts by customer code; missing codes count 1.
    pub(crate) line_counts: HashMap<String, u64>,
    /// Customer codes whose profile lookup fails.
    pub(crate) failing: HashSet<String>,
    pub(crate) bundle: BillDataBundle,
    queries: Mutex<Vec<ErpQuery>>,
}

impl FakeErp {
    pub(crate) fn with_candidates(candidates: Vec<EnrollmentCandidate>) -> Self {
        Self {
            candidates,
            bundle: sample_bundle(),
            ..Self::default()
        }
    }

    pub(crate) fn queries(&self) -> Vec<ErpQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl ErpSource for FakeErp {
    async fn list_enrollable(&self) -> Result<Vec<EnrollmentCandidate>, ErpError> {
        Ok(self.candidates.clone())
    }

    async fn count_related_lines(&self, query: &ErpQuery) -> Result<u64, ErpError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self
            .line_counts
            .get(&query.customer_code)
            .copied()
            .unwrap_or(1))
    }

    async fn customer_profile(&self, query: &ErpQuery) -> Result<CustomerProfile, ErpError> {
        if self.failing.contains(&query.customer_code) {
            return Err(ErpError::Connection("bridge reset".to_string()));
        }
        Ok(self.bundle.customer.clone())
    }

    async fn billing_summary(&self, _query: &ErpQuery) -> Result<BillingSummary, ErpError> {
        Ok(self.bundle.summary.clone())
    }

    async fn per_type_summary(&self, _query: &ErpQuery) -> Result<Vec<TypeSummary>, ErpError> {
        Ok(self.bundle.type_summary.clone())
    }

    async fn line_items(&self, _query: &ErpQuery) -> Result<Vec<LineItem>, ErpError> {
        Ok(self.bundle.items.clone())
    }
}

/// Gateway that records every request and answers with a fixed result.
pub(crate) struct RecordingGateway {
    reply: Mutex<Result<GatewayResponse, GatewayError>>,
    requests: Mutex<Vec<(Instant, NotificationRequest)>>,
}

impl RecordingGateway {
    pub(crate) fn answering(code: &str) -> Self {
        Self::replying(Ok(GatewayResponse {
            code: code.to_string(),
            message: format!("result {code}"),
            key: "msg-1".to_string(),
        }))
    }

    pub(crate) fn replying(reply: Result<GatewayResponse, GatewayError>) -> Self {
        Self {
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<NotificationRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub(crate) fn sent_at(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

impl NotificationGateway for RecordingGateway {
    async fn send(&self, request: &NotificationRequest) -> Result<GatewayResponse, GatewayError> {
        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        self.reply.lock().unwrap().clone()
    }
}
