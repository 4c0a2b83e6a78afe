//! Enrollment scenarios over a fake ERP source and an in-memory store.

use std::sync::Arc;

use billflow_shared::config::CalendarConfig;

use super::error::EnrollmentError;
use super::service::{EnrollmentOutcome, EnrollmentService};
use crate::bundle::BillDataBundle;
use crate::calendar::HolidayCalendar;
use crate::erp::{CorrelationKey, EnrollmentCandidate};
use crate::record::{BillRecord, FileCreateState, MailSendState};
use crate::testing::{FakeErp, InMemoryRecords, fixed_now, sample_candidate, sample_record};

type Fixture = (
    Arc<FakeErp>,
    Arc<InMemoryRecords>,
    EnrollmentService<FakeErp, InMemoryRecords>,
);

fn fixture(erp: FakeErp) -> Fixture {
    let erp = Arc::new(erp);
    let records = Arc::new(InMemoryRecords::default());
    let calendar = HolidayCalendar::from_config(&CalendarConfig::default()).unwrap();
    let service = EnrollmentService::new(Arc::clone(&erp), Arc::clone(&records), calendar);
    (erp, records, service)
}

#[tokio::test]
async fn test_candidate_enrolled_with_frozen_bundle() {
    let (_, records, service) = fixture(FakeErp::with_candidates(vec![sample_candidate("C001")]));

    let report = service.run(fixed_now()).await.unwrap();

    assert_eq!(report.candidates, 1);
    assert_eq!(report.enrolled, 1);
    let record = records.get(1);
    assert_eq!(record.bill_period, "202508");
    assert_eq!(record.file_state, FileCreateState::Pending);
    assert_eq!(record.mail_state, MailSendState::Pending);
    assert_eq!(record.created_at, fixed_now());
    let bundle: BillDataBundle = serde_json::from_str(&record.bundle).unwrap();
    assert_eq!(bundle.customer.name1, "Acme");
    assert_eq!(bundle.items.len(), 2);
    assert_eq!(bundle.summary.due_date, "20250825");
}

#[tokio::test]
async fn test_candidate_without_related_lines_is_skipped() {
    let mut erp = FakeErp::with_candidates(vec![sample_candidate("C001")]);
    erp.line_counts.insert("C001".to_string(), 0);
    let (_, records, service) = fixture(erp);

    let report = service.run(fixed_now()).await.unwrap();

    assert_eq!(report.skipped_no_lines, 1);
    assert!(records.all().is_empty());
}

#[tokio::test]
async fn test_second_run_skips_duplicate() {
    let (_, records, service) = fixture(FakeErp::with_candidates(vec![sample_candidate("C001")]));

    service.run(fixed_now()).await.unwrap();
    let report = service.run(fixed_now()).await.unwrap();

    assert_eq!(report.enrolled, 0);
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(records.all().len(), 1);
}

#[tokio::test]
async fn test_soft_deleted_record_does_not_block_enrollment() {
    let (_, records, service) = fixture(FakeErp::default());
    records.seed(BillRecord {
        deleted: true,
        ..sample_record(1)
    });

    let outcome = service
        .enroll(&sample_candidate("C001"), fixed_now())
        .await
        .unwrap();

    assert!(matches!(outcome, EnrollmentOutcome::Enrolled(_)));
}

#[tokio::test]
async fn test_duplicate_matches_on_order_number_alone() {
    let (_, records, service) = fixture(FakeErp::default());
    records.seed(BillRecord {
        group_no: None,
        ..sample_record(1)
    });
    let candidate = EnrollmentCandidate {
        group_no: None,
        ..sample_candidate("C001")
    };

    let outcome = service.enroll(&candidate, fixed_now()).await.unwrap();

    assert!(matches!(outcome, EnrollmentOutcome::DuplicateSkipped(id) if id.0 == 1));
}

#[tokio::test]
async fn test_group_key_does_not_match_on_shared_order_number() {
    let (_, records, service) = fixture(FakeErp::default());
    records.seed(BillRecord {
        group_no: Some("G-2".to_string()),
        ..sample_record(1)
    });

    let outcome = service
        .enroll(&sample_candidate("C001"), fixed_now())
        .await
        .unwrap();

    assert!(matches!(outcome, EnrollmentOutcome::Enrolled(_)));
}

#[tokio::test]
async fn test_zero_group_with_distinct_orders_enrolls_each_order() {
    let candidates = ["O-1", "O-2"]
        .into_iter()
        .map(|order| EnrollmentCandidate {
            group_no: Some("0".to_string()),
            order_no: Some(order.to_string()),
            ..sample_candidate("C001")
        })
        .collect();
    let (_, records, service) = fixture(FakeErp::with_candidates(candidates));

    let report = service.run(fixed_now()).await.unwrap();

    assert_eq!(report.enrolled, 2);
    assert_eq!(report.skipped_duplicate, 0);
    assert_eq!(records.all().len(), 2);

    let rerun = service.run(fixed_now()).await.unwrap();
    assert_eq!(rerun.skipped_duplicate, 2);
    assert_eq!(records.all().len(), 2);
}

#[tokio::test]
async fn test_zero_group_queries_by_order_number() {
    let candidate = EnrollmentCandidate {
        group_no: Some("0000000000".to_string()),
        ..sample_candidate("C001")
    };
    let (erp, _, service) = fixture(FakeErp::with_candidates(vec![candidate]));

    service.run(fixed_now()).await.unwrap();

    assert_eq!(erp.queries()[0].key, CorrelationKey::Order("O-1".to_string()));
}

#[tokio::test]
async fn test_group_number_preferred_when_present() {
    let (erp, _, service) = fixture(FakeErp::with_candidates(vec![sample_candidate("C001")]));

    service.run(fixed_now()).await.unwrap();

    assert_eq!(erp.queries()[0].key, CorrelationKey::Group("G-1".to_string()));
}

#[tokio::test]
async fn test_candidate_without_key_fails() {
    let (_, _, service) = fixture(FakeErp::default());
    let candidate = EnrollmentCandidate {
        group_no: None,
        order_no: None,
        ..sample_candidate("C001")
    };

    let err = service.enroll(&candidate, fixed_now()).await.unwrap_err();

    assert!(matches!(err, EnrollmentError::NoCorrelationKey { .. }));
    assert_eq!(err.error_code(), "NO_CORRELATION_KEY");
}

#[tokio::test]
async fn test_candidate_with_out_of_range_day_fails() {
    let (erp, _, service) = fixture(FakeErp::default());
    let candidate = EnrollmentCandidate {
        fixed_day: 0,
        ..sample_candidate("C001")
    };

    let err = service.enroll(&candidate, fixed_now()).await.unwrap_err();

    assert_eq!(err.error_code(), "INVALID_FIXED_DAY");
    assert!(erp.queries().is_empty());
}

#[tokio::test]
async fn test_failing_candidate_does_not_stop_the_run() {
    let mut erp = FakeErp::with_candidates(vec![sample_candidate("C001"), sample_candidate("C002")]);
    erp.failing.insert("C001".to_string());
    let (_, records, service) = fixture(erp);

    let report = service.run(fixed_now()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.enrolled, 1);
    assert_eq!(records.all()[0].customer_code, "C002");
}

#[tokio::test]
async fn test_empty_selection_falls_back_to_last_business_day() {
    let mut erp = FakeErp::with_candidates(vec![sample_candidate("C001")]);
    erp.bundle.summary.sel_count = 0;
    let (_, records, service) = fixture(erp);

    service.run(fixed_now()).await.unwrap();

    let bundle: BillDataBundle = serde_json::from_str(&records.get(1).bundle).unwrap();
    assert_eq!(bundle.summary.due_date, "20250829");
}

#[tokio::test]
async fn test_blank_summary_period_taken_from_candidate() {
    let mut erp = FakeErp::with_candidates(vec![sample_candidate("C001")]);
    erp.bundle.summary.bill_period = String::new();
    let (_, records, service) = fixture(erp);

    service.run(fixed_now()).await.unwrap();

    assert_eq!(records.get(1).bill_period, "202508");
}
