use async_trait::async_trait;
use contracts::domain::common::SheetId;
use contracts::usecases::u601_sheet_migration::{MigrationQuery, SyncStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::domain::{a101_financial_survey, a102_payroll, a103_loan, a104_write_off};
use crate::shared::data::db::test_connection;
use crate::shared::field_mapper::{FieldValue, FieldValues};
use crate::shared::sheets::memory::InMemorySheets;
use crate::shared::sheets::{RowLocator, SheetGateway};

const LOANS: &str = "Loans";
const LOAN_HEADERS: &[&str] = &[
    "ID",
    "Borrower ID",
    "Credit Application ID",
    "Principal Amount",
    "Term (Months)",
    "Status",
];

const SURVEYS: &str = "Financial Surveys";
const SURVEY_HEADERS: &[&str] = &[
    "ID",
    "Credit Application ID",
    "Survey Date",
    "Monthly Revenue",
    "Gross Profit",
];

const PAYROLL: &str = "Payroll";
const PAYROLL_HEADERS: &[&str] = &[
    "ID",
    "Staff ID",
    "Staff Name",
    "Pay Period",
    "Net Pay",
    "Paid (Y/N)",
    "Payment Date",
];

const WRITE_OFFS: &str = "Write-offs";
const WRITE_OFF_HEADERS: &[&str] = &[
    "ID",
    "Loan ID",
    "Borrower ID",
    "Write-off Date",
    "Amount Written Off",
    "Board Approved",
];

struct Harness {
    sheets: Arc<InMemorySheets>,
    store: Arc<dyn RecordStore>,
    executor: MigrationExecutor,
}

async fn loans(rows: Vec<Vec<&str>>) -> Harness {
    let sheets = Arc::new(InMemorySheets::new());
    sheets.put_sheet(LOANS, LOAN_HEADERS, rows);
    let store = a103_loan::u601_sheet_migration::store(test_connection().await);
    harness(&a103_loan::u601_sheet_migration::ENTITY, LOANS, sheets, store)
}

async fn surveys(rows: Vec<Vec<&str>>) -> Harness {
    let sheets = Arc::new(InMemorySheets::new());
    sheets.put_sheet(SURVEYS, SURVEY_HEADERS, rows);
    let store = a101_financial_survey::u601_sheet_migration::store(test_connection().await);
    harness(
        &a101_financial_survey::u601_sheet_migration::ENTITY,
        SURVEYS,
        sheets,
        store,
    )
}

async fn payroll(rows: Vec<Vec<&str>>) -> Harness {
    let sheets = Arc::new(InMemorySheets::new());
    sheets.put_sheet(PAYROLL, PAYROLL_HEADERS, rows);
    let store = a102_payroll::u601_sheet_migration::store(test_connection().await);
    harness(&a102_payroll::u601_sheet_migration::ENTITY, PAYROLL, sheets, store)
}

async fn write_offs(rows: Vec<Vec<&str>>) -> Harness {
    let sheets = Arc::new(InMemorySheets::new());
    sheets.put_sheet(WRITE_OFFS, WRITE_OFF_HEADERS, rows);
    let store = a104_write_off::u601_sheet_migration::store(test_connection().await);
    harness(
        &a104_write_off::u601_sheet_migration::ENTITY,
        WRITE_OFFS,
        sheets,
        store,
    )
}

fn harness(
    entity: &'static MigrationEntity,
    sheet_name: &str,
    sheets: Arc<InMemorySheets>,
    store: Arc<dyn RecordStore>,
) -> Harness {
    let gateway: Arc<dyn SheetGateway> = sheets.clone();
    let executor = MigrationExecutor::new(entity, sheet_name, gateway, store.clone(), Duration::ZERO);
    Harness {
        sheets,
        store,
        executor,
    }
}

fn query(key: &str, value: &str) -> MigrationQuery {
    MigrationQuery {
        params: HashMap::from([(key.to_string(), value.to_string())]),
    }
}

fn loan_values(borrower: &str, application: &str, status: &str) -> FieldValues {
    FieldValues::new()
        .with("borrower_id", FieldValue::Text(borrower.into()))
        .with("credit_application_id", FieldValue::Text(application.into()))
        .with("principal_amount", FieldValue::Number(50000.0))
        .with("status", FieldValue::Text(status.into()))
}

fn payroll_values(staff: &str, period: &str, net_pay: f64) -> FieldValues {
    FieldValues::new()
        .with("staff_id", FieldValue::Text(staff.into()))
        .with("staff_name", FieldValue::Text(format!("Staff {}", staff)))
        .with("pay_period", FieldValue::Text(period.into()))
        .with("net_pay", FieldValue::Number(net_pay))
        .with("paid", FieldValue::Integer(1))
}

fn write_off_values(loan: &str, date: &str, amount: f64) -> FieldValues {
    FieldValues::new()
        .with("loan_id", FieldValue::Text(loan.into()))
        .with("write_off_date", FieldValue::from_date_text(Some(date.into())))
        .with("amount_written_off", FieldValue::Number(amount))
        .with("board_approved", FieldValue::Integer(0))
}

/// Store whose inserts fail for one borrower
struct FailingStore {
    inner: Arc<dyn RecordStore>,
    borrower: &'static str,
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn count(&self) -> anyhow::Result<u64> {
        self.inner.count().await
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<StoreRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_sheet_id(&self, sheet_id: &str) -> anyhow::Result<Option<StoreRecord>> {
        self.inner.find_by_sheet_id(sheet_id).await
    }

    async fn find_unsynced(&self, correlation: Option<&str>) -> anyhow::Result<Vec<StoreRecord>> {
        self.inner.find_unsynced(correlation).await
    }

    async fn create(
        &self,
        values: &FieldValues,
        sheet_id: Option<SheetId>,
        synced: bool,
    ) -> anyhow::Result<StoreRecord> {
        if values.text("borrower_id") == Some(Some(self.borrower.to_string())) {
            anyhow::bail!("constraint violation for {}", self.borrower);
        }
        self.inner.create(values, sheet_id, synced).await
    }

    async fn update_fields(&self, id: &str, values: &FieldValues) -> anyhow::Result<()> {
        self.inner.update_fields(id, values).await
    }

    async fn update_sync_status(&self, id: &str, synced: bool) -> anyhow::Result<()> {
        self.inner.update_sync_status(id, synced).await
    }

    async fn set_sheet_id(&self, id: &str, sheet_id: SheetId) -> anyhow::Result<()> {
        self.inner.set_sheet_id(id, sheet_id).await
    }
}

// ============================================================================
// Import
// ============================================================================

#[tokio::test]
async fn test_import_then_reimport_updates_loans_in_place() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "KSh 50,000", "12", "Active"],
        vec!["LN-0002", "B-2", "CA-2", "30000", "6", "Active"],
    ])
    .await;

    let first = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((first.imported, first.updated, first.errors), (2, 0, 0));

    h.sheets.set_cell(LOANS, 3, "Status", "Closed").unwrap();
    let second = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((second.imported, second.updated, second.skipped), (0, 2, 0));
    assert_eq!(h.store.count().await.unwrap(), 2);

    let record = h.store.find_by_sheet_id("LN-0002").await.unwrap().unwrap();
    assert_eq!(record.values.text("status"), Some(Some("Closed".into())));
    assert_eq!(record.sheet_id, Some(SheetId::durable("LN-0002")));
    assert!(record.synced);
    let first_loan = h.store.find_by_sheet_id("LN-0001").await.unwrap().unwrap();
    assert_eq!(first_loan.values.number("principal_amount"), Some(Some(50000.0)));
}

#[tokio::test]
async fn test_reimport_skips_existing_surveys() {
    let h = surveys(vec![
        vec!["FS-0001", "CA-1", "15/05/2022", "120000", ""],
        vec!["FS-0002", "CA-2", "2022-06-01", "80000", ""],
    ])
    .await;

    let first = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(first.imported, 2);

    let second = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((second.imported, second.updated, second.skipped), (0, 0, 2));
    assert!(second
        .skipped_details
        .iter()
        .all(|s| s.reason == "Already exists"));
    assert_eq!(h.store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_import_promotes_pending_sheet_id() {
    let h = loans(vec![vec!["LN-0042", "B-1", "CA-1", "1000", "3", "Active"]]).await;
    let created = h
        .store
        .create(
            &loan_values("B-1", "CA-1", "Draft"),
            Some(SheetId::pending("LN-0042")),
            false,
        )
        .await
        .unwrap();

    let result = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.imported, result.updated), (0, 1));

    let record = h.store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable("LN-0042")));
    assert_eq!(record.values.text("status"), Some(Some("Active".into())));
    assert_eq!(h.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_blank_rows_and_missing_ids_are_skipped_not_failed() {
    let h = loans(vec![
        vec!["", "", "", "", "", ""],
        vec!["", "B-7", "CA-7", "100", "1", "Active"],
        vec!["(empty)", "B-8", "CA-8", "100", "1", "Active"],
        vec!["LN-0004", "B-9", "CA-9", "100", "1", "Active"],
    ])
    .await;

    let result = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.imported, result.skipped, result.errors), (1, 3, 0));
    let reasons: Vec<&str> = result
        .skipped_details
        .iter()
        .map(|s| s.reason.as_str())
        .collect();
    assert_eq!(reasons, vec!["Completely empty record", "Empty ID", "Empty ID"]);
    assert_eq!(result.skipped_details[1].row_number, Some(3));
}

#[tokio::test]
async fn test_duplicate_sheet_ids_import_once() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["LN-0001", "B-2", "CA-2", "200", "2", "Active"],
    ])
    .await;

    let result = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.imported, result.skipped), (1, 1));
    assert_eq!(
        result.skipped_details[0].reason,
        "Duplicate ID (first seen on row 2)"
    );
    let record = h.store.find_by_sheet_id("LN-0001").await.unwrap().unwrap();
    assert_eq!(record.values.text("borrower_id"), Some(Some("B-1".into())));
}

#[tokio::test]
async fn test_import_narrowed_by_correlation_key() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Active"],
        vec!["LN-0003", " B-1 ", "CA-3", "300", "3", "Active"],
    ])
    .await;

    let result = h
        .executor
        .import_from_sheets(&query("borrowerId", "B-1"))
        .await
        .unwrap();
    assert_eq!((result.imported, result.skipped), (2, 1));
    assert_eq!(result.skipped_details[0].id, "LN-0002");
    assert!(result.skipped_details[0]
        .reason
        .starts_with("Correlation key mismatch"));

    // Other entities' parameters are ignored
    let h = loans(vec![vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"]]).await;
    let result = h
        .executor
        .import_from_sheets(&query("loanId", "LN-0009"))
        .await
        .unwrap();
    assert_eq!(result.imported, 1);
}

#[tokio::test]
async fn test_row_failure_does_not_stop_the_batch() {
    let sheets = Arc::new(InMemorySheets::new());
    sheets.put_sheet(
        LOANS,
        LOAN_HEADERS,
        vec![
            vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
            vec!["LN-0002", "B-FAIL", "CA-2", "200", "2", "Active"],
            vec!["LN-0003", "B-3", "CA-3", "300", "3", "Active"],
        ],
    );
    let store: Arc<dyn RecordStore> = Arc::new(FailingStore {
        inner: a103_loan::u601_sheet_migration::store(test_connection().await),
        borrower: "B-FAIL",
    });
    let h = harness(&a103_loan::u601_sheet_migration::ENTITY, LOANS, sheets, store);

    let result = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.imported, result.errors), (2, 1));
    assert_eq!(result.error_details[0].id, "LN-0002");
    assert_eq!(result.error_details[0].row_number, Some(3));
    assert!(result.error_details[0].error.contains("constraint violation"));
    assert_eq!(h.store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_unreadable_sheet_fails_the_run() {
    let h = loans(vec![]).await;
    h.sheets.set_fail_reads(true);
    let err = h
        .executor
        .import_from_sheets(&MigrationQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::SheetApi { .. }));
    assert!(h.executor.status().await.is_err());
}

#[tokio::test]
async fn test_concurrent_imports_do_not_duplicate() {
    let h = surveys(vec![
        vec!["FS-0001", "CA-1", "15/05/2022", "1000", ""],
        vec!["FS-0002", "CA-2", "16/05/2022", "2000", ""],
    ])
    .await;
    let q = MigrationQuery::default();
    let (a, b) = tokio::join!(
        h.executor.import_from_sheets(&q),
        h.executor.import_from_sheets(&q)
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.imported + b.imported, 2);
    assert_eq!(a.skipped + b.skipped, 2);
    assert_eq!(h.store.count().await.unwrap(), 2);
}

// ============================================================================
// Status / full migration
// ============================================================================

#[tokio::test]
async fn test_status_compares_counts() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["", "", "", "", "", ""],
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Active"],
    ])
    .await;

    let status = h.executor.status().await.unwrap();
    assert_eq!((status.database.total, status.sheets.total), (0, 2));
    assert_eq!(status.sync_status, SyncStatus::OutOfSync);

    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    let status = h.executor.status().await.unwrap();
    assert_eq!((status.database.total, status.sheets.total), (2, 2));
    assert_eq!(status.sync_status, SyncStatus::Synced);
}

#[tokio::test]
async fn test_status_counts_duplicate_ids_once() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Active"],
        vec!["LN-0001", "B-3", "CA-3", "300", "3", "Active"],
    ])
    .await;
    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();

    let status = h.executor.status().await.unwrap();
    assert_eq!((status.database.total, status.sheets.total), (2, 2));
    assert_eq!(status.sync_status, SyncStatus::Synced);

    let reads_before = h.sheets.full_reads();
    let result = h.executor.full_migration(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.message.as_deref(), Some("Already fully synced"));
    assert_eq!(h.sheets.full_reads() - reads_before, 1);
}

#[tokio::test]
async fn test_full_migration_short_circuits_when_synced() {
    let h = loans(vec![vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"]]).await;
    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();

    let reads_before = h.sheets.full_reads();
    let result = h.executor.full_migration(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.message.as_deref(), Some("Already fully synced"));
    assert_eq!((result.imported, result.synced, result.errors), (0, 0, 0));
    assert_eq!(h.sheets.full_reads() - reads_before, 1);
}

#[tokio::test]
async fn test_full_migration_runs_both_directions() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Active"],
    ])
    .await;
    h.store
        .create(&loan_values("B-3", "CA-3", "Approved"), None, false)
        .await
        .unwrap();

    let result = h.executor.full_migration(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.message, None);
    assert_eq!((result.imported, result.synced, result.errors), (2, 1, 0));
    assert_eq!(h.sheets.row(LOANS, 4).unwrap()[0], "LN-0003");

    let status = h.executor.status().await.unwrap();
    assert_eq!(status.sync_status, SyncStatus::Synced);
    assert_eq!(status.database.total, 3);
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_export_appends_with_next_identifiers() {
    let h = loans(vec![vec!["LN-0007", "B-9", "CA-9", "100", "1", "Active"]]).await;
    for borrower in ["B-1", "B-2"] {
        h.store
            .create(&loan_values(borrower, &format!("CA-{}", borrower), "Approved"), None, false)
            .await
            .unwrap();
    }

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.synced, result.errors), (2, 0));
    assert_eq!(h.sheets.data_row_count(LOANS), 3);

    for (row, sheet_id) in [(3, "LN-0008"), (4, "LN-0009")] {
        let cells = h.sheets.row(LOANS, row).unwrap();
        assert_eq!(cells[0], sheet_id);
        assert_eq!(cells[3], "50000");
        let record = h.store.find_by_sheet_id(sheet_id).await.unwrap().unwrap();
        assert!(record.synced);
        assert_eq!(record.values.text("borrower_id"), Some(Some(cells[1].clone())));
    }
    assert!(h.store.find_unsynced(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_export_updates_linked_row_in_place() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Active"],
    ])
    .await;
    let created = h
        .store
        .create(
            &FieldValues::new()
                .with("borrower_id", FieldValue::Text("B-2".into()))
                .with("status", FieldValue::Text("Written off".into()))
                .with("principal_amount", FieldValue::Null),
            Some(SheetId::durable("LN-0002")),
            false,
        )
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.synced, 1);
    assert_eq!(h.sheets.data_row_count(LOANS), 2);
    // Null values leave the sheet cell alone
    assert_eq!(
        h.sheets.row(LOANS, 3).unwrap(),
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Written off"]
    );
    assert!(h.store.find_by_id(&created.id).await.unwrap().unwrap().synced);
}

#[tokio::test]
async fn test_export_backfills_natural_key_match() {
    let h = loans(vec![
        vec!["LN-0003", "B-5", "CA-4", "100", "1", "Active"],
        vec!["", "B-5", "CA-5", "", "", "Pending"],
    ])
    .await;
    let created = h
        .store
        .create(&loan_values("B-5", "CA-5", "Active"), None, false)
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.synced, 1);
    assert_eq!(h.sheets.data_row_count(LOANS), 2);
    assert_eq!(
        h.sheets.row(LOANS, 3).unwrap(),
        vec!["LN-0004", "B-5", "CA-5", "50000", "", "Active"]
    );
    let record = h.store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable("LN-0004")));
}

#[tokio::test]
async fn test_export_does_not_steal_row_of_another_record() {
    let h = loans(vec![vec!["LN-0001", "B-5", "CA-5", "100", "1", "Active"]]).await;
    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    h.store
        .create(&loan_values("B-5", "CA-5", "Active"), None, false)
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.synced, 1);
    assert_eq!(h.sheets.data_row_count(LOANS), 2);
    assert_eq!(h.sheets.row(LOANS, 3).unwrap()[0], "LN-0002");
}

#[tokio::test]
async fn test_export_relinks_when_durable_id_is_gone() {
    let h = loans(vec![vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"]]).await;
    let created = h
        .store
        .create(
            &loan_values("B-2", "CA-2", "Active"),
            Some(SheetId::durable("LN-0050")),
            false,
        )
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.synced, 1);
    let record = h.store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable("LN-0002")));
}

#[tokio::test]
async fn test_export_skips_identifier_of_deleted_sheet_row() {
    let h = loans(vec![
        vec!["LN-0001", "B-1", "CA-1", "100", "1", "Active"],
        vec!["LN-0002", "B-2", "CA-2", "200", "2", "Active"],
    ])
    .await;
    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    let deleted = h.store.find_by_sheet_id("LN-0002").await.unwrap().unwrap();

    // The row disappears on the sheet side; its record keeps LN-0002
    h.sheets
        .clear(LOANS, RowLocator::Id("LN-0002".into()))
        .await
        .unwrap();
    let created = h
        .store
        .create(&loan_values("B-9", "CA-9", "Approved"), None, false)
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.synced, result.errors), (1, 0));
    let appended = h.sheets.row(LOANS, 4).unwrap();
    assert_eq!(appended[0], "LN-0003");
    assert_eq!(appended[1], "B-9");
    let record = h.store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable("LN-0003")));
    assert!(record.synced);

    let reimport = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(
        (reimport.imported, reimport.updated, reimport.skipped, reimport.errors),
        (0, 2, 1, 0)
    );
    let untouched = h.store.find_by_id(&deleted.id).await.unwrap().unwrap();
    assert_eq!(untouched.sheet_id, Some(SheetId::durable("LN-0002")));
    assert_eq!(untouched.values.text("borrower_id"), Some(Some("B-2".into())));
    assert_eq!(h.store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_failed_write_leaves_record_unsynced() {
    let h = loans(vec![]).await;
    let created = h
        .store
        .create(&loan_values("B-1", "CA-1", "Active"), None, false)
        .await
        .unwrap();
    h.sheets.set_fail_writes(true);

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((result.synced, result.errors), (0, 1));
    assert_eq!(result.error_details[0].id, created.id);

    let record = h.store.find_by_id(&created.id).await.unwrap().unwrap();
    assert!(!record.synced);
    assert_eq!(record.sheet_id, None);

    h.sheets.set_fail_writes(false);
    let retry = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(retry.synced, 1);
}

#[tokio::test]
async fn test_export_narrowed_by_correlation_key() {
    let h = loans(vec![]).await;
    for borrower in ["B-1", "B-2"] {
        h.store
            .create(&loan_values(borrower, "CA-1", "Active"), None, false)
            .await
            .unwrap();
    }
    let result = h
        .executor
        .sync_to_sheets(&query("borrowerId", "B-2"))
        .await
        .unwrap();
    assert_eq!(result.synced, 1);
    assert_eq!(h.store.find_unsynced(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_export_requires_id_column() {
    let sheets = Arc::new(InMemorySheets::new());
    sheets.put_sheet(LOANS, &["Borrower ID", "Status"], vec![]);
    let store = a103_loan::u601_sheet_migration::store(test_connection().await);
    let h = harness(&a103_loan::u601_sheet_migration::ENTITY, LOANS, sheets, store);
    h.store
        .create(&loan_values("B-1", "CA-1", "Active"), None, false)
        .await
        .unwrap();

    let err = h
        .executor
        .sync_to_sheets(&MigrationQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Setup(_)));
}

#[tokio::test]
async fn test_read_back_copies_formula_values() {
    let h = surveys(vec![]).await;
    let created = h
        .store
        .create(
            &FieldValues::new()
                .with("credit_application_id", FieldValue::Text("CA-1".into()))
                .with("monthly_revenue", FieldValue::Number(1000.0)),
            None,
            false,
        )
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(result.synced, 1);
    let row = h.sheets.row(SURVEYS, 2).unwrap();
    assert_eq!(row[0], "FS-0001");
    assert_eq!(row[4], "");

    // The sheet recalculates its formula column
    h.sheets.set_cell(SURVEYS, 2, "Gross Profit", "KSh 400").unwrap();

    let mut gross_profit = None;
    for _ in 0..50 {
        let record = h.store.find_by_id(&created.id).await.unwrap().unwrap();
        gross_profit = record.values.number("gross_profit").flatten();
        if gross_profit.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(gross_profit, Some(400.0));
}

#[tokio::test]
async fn test_read_back_without_computed_values_changes_nothing() {
    let h = surveys(vec![vec!["FS-0001", "CA-1", "01/01/2024", "1000", ""]]).await;
    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    let before = h.store.find_by_sheet_id("FS-0001").await.unwrap().unwrap();

    let written = read_back::run(
        h.sheets.as_ref(),
        h.store.as_ref(),
        &read_back::ReadBack {
            entity: &a101_financial_survey::u601_sheet_migration::ENTITY,
            sheet_name: SURVEYS.to_string(),
            sheet_id: "FS-0001".to_string(),
            record_id: before.id.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(written, 0);
    let after = h.store.find_by_id(&before.id).await.unwrap().unwrap();
    assert_eq!(after.values, before.values);
}

// ============================================================================
// Payroll / write-offs
// ============================================================================

#[tokio::test]
async fn test_payroll_import_then_reimport_skips() {
    let h = payroll(vec![
        vec!["PR-0001", "S-1", "Achieng", "2023-03", "KSh 42,000", "Yes", "31/03/2023"],
        vec!["PR-0002", "S-2", "Otieno", "2023-03", "38000", "No", ""],
    ])
    .await;

    let first = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((first.imported, first.errors), (2, 0));
    let record = h.store.find_by_sheet_id("PR-0001").await.unwrap().unwrap();
    assert_eq!(record.values.text("staff_id"), Some(Some("S-1".into())));
    assert_eq!(record.values.number("net_pay"), Some(Some(42000.0)));
    assert_eq!(record.values.integer("paid"), Some(Some(1)));
    assert_eq!(record.values.date("payment_date"), Some(Some("2023-03-31".into())));

    h.sheets.set_cell(PAYROLL, 3, "Paid (Y/N)", "Yes").unwrap();
    let second = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((second.imported, second.updated, second.skipped), (0, 0, 2));
    assert!(second
        .skipped_details
        .iter()
        .all(|s| s.reason == "Already exists"));
    let record = h.store.find_by_sheet_id("PR-0002").await.unwrap().unwrap();
    assert_eq!(record.values.integer("paid"), Some(Some(0)));
}

#[tokio::test]
async fn test_payroll_runs_narrowed_by_staff_id() {
    let h = payroll(vec![
        vec!["PR-0001", "S-1", "Achieng", "2023-03", "42000", "Yes", ""],
        vec!["PR-0002", "S-2", "Otieno", "2023-03", "38000", "Yes", ""],
        vec!["PR-0003", "S-1", "Achieng", "2023-04", "42000", "No", ""],
    ])
    .await;

    let result = h
        .executor
        .import_from_sheets(&query("staffId", "S-1"))
        .await
        .unwrap();
    assert_eq!((result.imported, result.skipped), (2, 1));
    assert_eq!(result.skipped_details[0].id, "PR-0002");
    assert!(result.skipped_details[0]
        .reason
        .starts_with("Correlation key mismatch"));
    assert!(h.store.find_by_sheet_id("PR-0002").await.unwrap().is_none());

    for staff in ["S-1", "S-2"] {
        h.store
            .create(&payroll_values(staff, "2023-05", 40000.0), None, false)
            .await
            .unwrap();
    }
    let result = h.executor.sync_to_sheets(&query("staffId", "S-2")).await.unwrap();
    assert_eq!((result.synced, result.errors), (1, 0));
    let unsynced = h.store.find_unsynced(None).await.unwrap();
    assert_eq!(unsynced.len(), 1);
    assert_eq!(unsynced[0].values.text("staff_id"), Some(Some("S-1".into())));
}

#[tokio::test]
async fn test_payroll_export_backfills_and_appends() {
    let h = payroll(vec![
        vec!["PR-0003", "S-1", "Achieng", "2023-03", "42000", "Yes", ""],
        vec!["", "S-1", "Achieng", "2023-04", "", "", ""],
    ])
    .await;
    let backfilled = h
        .store
        .create(&payroll_values("S-1", "2023-04", 43500.0), None, false)
        .await
        .unwrap();
    let appended = h
        .store
        .create(&payroll_values("S-2", "2023-04", 38000.0), None, false)
        .await
        .unwrap();

    let first = h.executor.sync_to_sheets(&query("staffId", "S-1")).await.unwrap();
    assert_eq!((first.synced, first.errors), (1, 0));
    assert_eq!(h.sheets.data_row_count(PAYROLL), 2);
    assert_eq!(
        h.sheets.row(PAYROLL, 3).unwrap(),
        vec!["PR-0004", "S-1", "Staff S-1", "2023-04", "43500", "Yes", ""]
    );

    let second = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((second.synced, second.errors), (1, 0));
    let cells = h.sheets.row(PAYROLL, 4).unwrap();
    assert_eq!((cells[0].as_str(), cells[1].as_str()), ("PR-0005", "S-2"));

    let record = h.store.find_by_id(&backfilled.id).await.unwrap().unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable("PR-0004")));
    let record = h.store.find_by_id(&appended.id).await.unwrap().unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable("PR-0005")));

    let reimport = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((reimport.imported, reimport.skipped), (1, 2));
    assert_eq!(h.store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_write_off_import_narrowed_by_loan_then_reimport_skips() {
    let h = write_offs(vec![
        vec!["WO-0001", "LN-0001", "B-1", "31/03/2023", "KSh 12,500", "Yes"],
        vec!["WO-0002", "LN-0002", "B-2", "15/04/2023", "8000", "No"],
    ])
    .await;

    let narrowed = h
        .executor
        .import_from_sheets(&query("loanId", "LN-0001"))
        .await
        .unwrap();
    assert_eq!((narrowed.imported, narrowed.skipped), (1, 1));
    assert_eq!(narrowed.skipped_details[0].id, "WO-0002");
    let record = h.store.find_by_sheet_id("WO-0001").await.unwrap().unwrap();
    assert_eq!(record.values.text("loan_id"), Some(Some("LN-0001".into())));
    assert_eq!(record.values.date("write_off_date"), Some(Some("2023-03-31".into())));
    assert_eq!(record.values.number("amount_written_off"), Some(Some(12500.0)));
    assert_eq!(record.values.integer("board_approved"), Some(Some(1)));

    let full = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((full.imported, full.skipped), (1, 1));
    assert_eq!(full.skipped_details[0].reason, "Already exists");

    h.sheets.set_cell(WRITE_OFFS, 2, "Amount Written Off", "99999").unwrap();
    let again = h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!((again.imported, again.updated, again.skipped), (0, 0, 2));
    let record = h.store.find_by_sheet_id("WO-0001").await.unwrap().unwrap();
    assert_eq!(record.values.number("amount_written_off"), Some(Some(12500.0)));
}

#[tokio::test]
async fn test_write_off_export_matches_on_loan_and_date() {
    let h = write_offs(vec![vec!["", "LN-0003", "B-3", "02/05/2023", "", ""]]).await;
    let matched = h
        .store
        .create(&write_off_values("LN-0003", "2023-05-02", 15000.0), None, false)
        .await
        .unwrap();
    let later = h
        .store
        .create(&write_off_values("LN-0003", "2023-06-30", 2000.0), None, false)
        .await
        .unwrap();
    h.store
        .create(&write_off_values("LN-0004", "2023-05-02", 7000.0), None, false)
        .await
        .unwrap();

    let result = h.executor.sync_to_sheets(&query("loanId", "LN-0003")).await.unwrap();
    assert_eq!((result.synced, result.errors), (2, 0));
    assert_eq!(h.sheets.data_row_count(WRITE_OFFS), 2);

    // Same loan and date: the existing row is filled in, whatever ID it got
    let record = h.store.find_by_id(&matched.id).await.unwrap().unwrap();
    let row = h.sheets.row(WRITE_OFFS, 2).unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable(&row[0])));
    assert_eq!(&row[1..], &["LN-0003", "B-3", "02/05/2023", "15000", "No"]);

    let record = h.store.find_by_id(&later.id).await.unwrap().unwrap();
    let row = h.sheets.row(WRITE_OFFS, 3).unwrap();
    assert_eq!(record.sheet_id, Some(SheetId::durable(&row[0])));
    assert_eq!(&row[1..4], &["LN-0003", "", "30/06/2023"]);

    let mut ids = vec![
        h.sheets.row(WRITE_OFFS, 2).unwrap()[0].clone(),
        h.sheets.row(WRITE_OFFS, 3).unwrap()[0].clone(),
    ];
    ids.sort();
    assert_eq!(ids, vec!["WO-0001", "WO-0002"]);

    let unsynced = h.store.find_unsynced(None).await.unwrap();
    assert_eq!(unsynced.len(), 1);
    assert_eq!(unsynced[0].values.text("loan_id"), Some(Some("LN-0004".into())));

    let rest = h.executor.sync_to_sheets(&MigrationQuery::default()).await.unwrap();
    assert_eq!(rest.synced, 1);
    let row = h.sheets.row(WRITE_OFFS, 4).unwrap();
    assert_eq!(&row[..4], &["WO-0003", "LN-0004", "", "02/05/2023"]);
}

// ============================================================================
// Compare / columns
// ============================================================================

#[tokio::test]
async fn test_compare_reports_field_differences() {
    let h = loans(vec![vec!["LN-0001", "B-1", "CA-1", "KSh 50,000.00", "12", "Active"]]).await;
    h.executor.import_from_sheets(&MigrationQuery::default()).await.unwrap();
    h.sheets.set_cell(LOANS, 2, "Status", "Closed").unwrap();

    let result = h.executor.compare("LN-0001").await.unwrap();
    let comparison = result.comparison;
    assert_eq!(comparison.differences.len(), 1);
    let diff = &comparison.differences[0];
    assert_eq!(diff.field, "status");
    assert_eq!(diff.sheet_value, serde_json::json!("Closed"));
    assert_eq!(diff.store_value, serde_json::json!("Active"));
    assert_eq!(
        comparison.sheets.unwrap()["Principal Amount"],
        serde_json::json!("KSh 50,000.00")
    );
    assert_eq!(
        comparison.database.unwrap()["sheetId"],
        serde_json::json!("LN-0001")
    );
}

#[tokio::test]
async fn test_compare_one_sided_and_missing() {
    let h = loans(vec![]).await;
    h.store
        .create(
            &loan_values("B-1", "CA-1", "Active"),
            Some(SheetId::durable("LN-0005")),
            true,
        )
        .await
        .unwrap();

    let result = h.executor.compare("LN-0005").await.unwrap();
    assert!(result.comparison.sheets.is_none());
    assert!(result.comparison.database.is_some());
    assert!(result.comparison.differences.is_empty());

    let err = h.executor.compare("LN-0404").await.unwrap_err();
    assert!(matches!(err, MigrationError::NotFound(_)));
}

#[tokio::test]
async fn test_columns_with_samples() {
    let h = loans(vec![
        vec!["", "", "", "", "", ""],
        vec!["LN-0001", "(empty)", "", "100", "1", "Active"],
        vec!["LN-0002", "B-2", "", "200", "2", "Closed"],
    ])
    .await;

    let result = h.executor.columns().await.unwrap();
    assert_eq!(result.sheet_name, LOANS);
    let samples: Vec<(&str, Option<&str>)> = result
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.sample.as_deref()))
        .collect();
    assert_eq!(
        samples,
        vec![
            ("ID", Some("LN-0001")),
            ("Borrower ID", Some("B-2")),
            ("Credit Application ID", None),
            ("Principal Amount", Some("100")),
            ("Term (Months)", Some("1")),
            ("Status", Some("Active")),
        ]
    );
}
