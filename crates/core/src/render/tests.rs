//! Render batch scenarios over in-memory stores and a local storage root.

use std::sync::Arc;

use billflow_shared::config::{MissingProfilePolicy, RenderConfig, StorageProvider};
use billflow_shared::types::BillRecordId;

use super::error::{RenderError, TemplateError};
use super::service::{RENDER_STAGE, RenderOptions, RenderService};
use super::workbook::{read_workbook, write_workbook};
use crate::bundle::LedgerColumn;
use crate::profile::TemplateVisibilityProfile;
use crate::record::{FileCreateState, RecordError, RenderedArtifact};
use crate::storage::StorageService;
use crate::testing::{
    InMemoryCheckpoints, InMemoryProfiles, InMemoryRecords, fixed_now, sample_bundle,
    sample_record,
};

const HTML_TEMPLATE: &str = "\
<h1>${name1}</h1>\
<table><!-- BEGIN ROWS items --><tr><td>${productName}</td><td>${rowTotal_FMT}</td></tr>\
<!-- END ROWS items --></table>\
<!-- BEGIN SECTION showMore --><a>more</a><!-- END SECTION showMore -->";

struct Harness {
    _dir: tempfile::TempDir,
    storage: StorageService,
    records: Arc<InMemoryRecords>,
    checkpoints: Arc<InMemoryCheckpoints>,
    profiles: Arc<InMemoryProfiles>,
    service: RenderService<InMemoryRecords, InMemoryCheckpoints, InMemoryProfiles>,
}

async fn harness_with(render: RenderConfig, with_excel_template: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageService::from_provider(&StorageProvider::local_fs(dir.path())).unwrap();
    storage
        .write("templates/statement.html", HTML_TEMPLATE.as_bytes().to_vec())
        .await
        .unwrap();
    if with_excel_template {
        let xlsx = write_workbook(&umya_spreadsheet::new_file()).unwrap();
        storage.write("templates/ledger.xlsx", xlsx).await.unwrap();
    }

    let records = Arc::new(InMemoryRecords::default());
    let checkpoints = Arc::new(InMemoryCheckpoints::default());
    let profiles = Arc::new(InMemoryProfiles::default());
    let options = RenderOptions {
        render,
        template_prefix: "templates".to_string(),
        output_prefix: "statements".to_string(),
        timezone: chrono_tz::Asia::Seoul,
    };
    let service = RenderService::new(
        Arc::clone(&records),
        Arc::clone(&checkpoints),
        Arc::clone(&profiles),
        storage.clone(),
        options,
    );
    Harness {
        _dir: dir,
        storage,
        records,
        checkpoints,
        profiles,
        service,
    }
}

async fn harness() -> Harness {
    harness_with(RenderConfig::default(), true).await
}

fn invalid_record(id: i64) -> crate::record::BillRecord {
    let mut bundle = sample_bundle();
    bundle.customer.stcd2 = "12345".to_string();
    crate::record::BillRecord {
        bundle: bundle.to_json().unwrap(),
        ..sample_record(id)
    }
}

#[tokio::test]
async fn test_batch_renders_pending_records() {
    let h = harness().await;
    h.records.seed(sample_record(1));
    h.records.seed(sample_record(2));

    let report = h.service.run_batch(fixed_now()).await.unwrap();

    assert_eq!(report.rendered, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.resumed_after, None);
    assert_eq!(h.checkpoints.current(RENDER_STAGE), None);

    let record = h.records.get(1);
    assert_eq!(record.file_state, FileCreateState::Created);
    assert_eq!(record.file_created_at, Some(fixed_now()));
    let html = record.html.unwrap();
    let excel = record.excel.unwrap();
    assert_eq!(html.storage_path, "statements/1234567890/202508");
    assert_eq!(html.display_name, "Acme_202508_statement.html");
    assert_eq!(excel.display_name, "Acme_202508_ledger.xlsx");
    assert!(html.storage_name.starts_with("1234567890_1_"));
    assert_ne!(html.key(), h.records.get(2).html.unwrap().key());

    let page = String::from_utf8(h.storage.read(&html.key()).await.unwrap()).unwrap();
    assert!(page.contains("<h1>Acme</h1>"));
    assert!(page.contains("<td>Water purifier</td><td>11,000</td>"));
    assert!(!page.contains("more"));

    let book = read_workbook(&h.storage.read(&excel.key()).await.unwrap()).unwrap();
    let sheet = book.get_sheet(&0).unwrap();
    assert_eq!(sheet.get_value((2, 3)), "Acme");
    assert_eq!(sheet.get_value((2, 4)), "1234567890");
}

#[tokio::test]
async fn test_invalid_business_id_marks_record_failed() {
    let h = harness().await;
    h.records.seed(sample_record(1));
    h.records.seed(invalid_record(2));

    let report = h.service.run_batch(fixed_now()).await.unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(report.failed, 1);
    let failed = h.records.get(2);
    assert_eq!(failed.file_state, FileCreateState::Failed);
    assert!(failed.html.is_none());
    assert!(failed.render_error.unwrap().contains("stcd2"));
}

#[tokio::test]
async fn test_missing_template_fails_batch_without_marking() {
    let h = harness_with(RenderConfig::default(), false).await;
    h.records.seed(sample_record(1));

    let err = h.service.run_batch(fixed_now()).await.unwrap_err();

    assert!(matches!(
        err,
        RenderError::Template(TemplateError::Missing(ref key)) if key == "templates/ledger.xlsx"
    ));
    assert_eq!(h.records.get(1).file_state, FileCreateState::Pending);
}

#[tokio::test]
async fn test_skip_limit_aborts_and_next_run_resumes() {
    let render = RenderConfig {
        skip_limit: 1,
        ..RenderConfig::default()
    };
    let h = harness_with(render, true).await;
    h.records.seed(invalid_record(1));
    h.records.seed(invalid_record(2));
    h.records.seed(sample_record(3));

    let err = h.service.run_batch(fixed_now()).await.unwrap_err();
    assert!(matches!(
        err,
        RenderError::BatchAborted {
            failures: 2,
            limit: 1
        }
    ));
    assert_eq!(h.checkpoints.current(RENDER_STAGE), Some(BillRecordId(2)));
    assert_eq!(h.records.get(3).file_state, FileCreateState::Pending);

    let report = h.service.run_batch(fixed_now()).await.unwrap();
    assert_eq!(report.resumed_after, Some(BillRecordId(2)));
    assert_eq!(report.rendered, 1);
    assert_eq!(h.records.get(3).file_state, FileCreateState::Created);
    assert_eq!(h.checkpoints.current(RENDER_STAGE), None);
}

#[tokio::test]
async fn test_missing_profile_under_fail_policy() {
    let render = RenderConfig {
        missing_profile: MissingProfilePolicy::Fail,
        ..RenderConfig::default()
    };
    let h = harness_with(render, true).await;
    h.records.seed(sample_record(1));
    h.records.seed(crate::record::BillRecord {
        business_id: "9999999999".to_string(),
        ..sample_record(2)
    });
    h.profiles
        .insert(TemplateVisibilityProfile::all_visible("1234567890").hiding(LedgerColumn::Remark));

    let report = h.service.run_batch(fixed_now()).await.unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(h.records.get(2).file_state, FileCreateState::Failed);
}

#[tokio::test]
async fn test_long_ledger_shows_more_link() {
    let h = harness().await;
    let mut bundle = sample_bundle();
    let item = bundle.items[0].clone();
    bundle.items = vec![item; 11];
    h.records.seed(crate::record::BillRecord {
        bundle: bundle.to_json().unwrap(),
        ..sample_record(1)
    });

    h.service.run_batch(fixed_now()).await.unwrap();

    let html = h.records.get(1).html.unwrap();
    let page = String::from_utf8(h.storage.read(&html.key()).await.unwrap()).unwrap();
    assert!(page.contains("<a>more</a>"));
}

#[tokio::test]
async fn test_rerender_replaces_references() {
    let h = harness().await;
    h.records.seed(sample_record(1));
    h.service.run_batch(fixed_now()).await.unwrap();
    let first = h.records.get(1).html.unwrap();

    let later = fixed_now() + chrono::Duration::minutes(5);
    let artifacts = h.service.render_record(BillRecordId(1), later).await.unwrap();

    let record = h.records.get(1);
    assert_eq!(record.file_state, FileCreateState::Created);
    assert_eq!(record.html.as_ref(), Some(&artifacts.html));
    assert_ne!(artifacts.html.storage_name, first.storage_name);
    assert!(h.storage.exists(&artifacts.excel.key()).await.unwrap());
}

#[tokio::test]
async fn test_failed_rerender_keeps_previous_references() {
    let h = harness().await;
    let previous = RenderedArtifact {
        display_name: "Acme_202508_statement.html".to_string(),
        storage_name: "1234567890_1_old.html".to_string(),
        storage_path: "statements/1234567890/202508".to_string(),
    };
    h.records.seed(crate::record::BillRecord {
        file_state: FileCreateState::Created,
        html: Some(previous.clone()),
        ..invalid_record(1)
    });

    let err = h
        .service
        .render_record(BillRecordId(1), fixed_now())
        .await
        .unwrap_err();

    assert!(matches!(err, RenderError::Validation(_)));
    let record = h.records.get(1);
    assert_eq!(record.file_state, FileCreateState::Created);
    assert_eq!(record.html, Some(previous));
}

#[tokio::test]
async fn test_manual_render_of_pending_record_marks_failure() {
    let h = harness().await;
    h.records.seed(invalid_record(1));

    let err = h
        .service
        .render_record(BillRecordId(1), fixed_now())
        .await
        .unwrap_err();

    assert!(err.is_terminal());
    assert_eq!(h.records.get(1).file_state, FileCreateState::Failed);
}

#[tokio::test]
async fn test_failed_record_is_not_renderable() {
    let h = harness().await;
    h.records.seed(crate::record::BillRecord {
        file_state: FileCreateState::Failed,
        ..sample_record(1)
    });

    let err = h
        .service
        .render_record(BillRecordId(1), fixed_now())
        .await
        .unwrap_err();

    assert!(matches!(err, RenderError::NotRenderable { id, .. } if id == BillRecordId(1)));
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let h = harness().await;

    let err = h
        .service
        .render_record(BillRecordId(42), fixed_now())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RenderError::Record(RecordError::NotFound(id)) if id == BillRecordId(42)
    ));
}
