use crate::usecases::common::UseCaseError;
use serde::{Deserialize, Serialize};

/// Every migration endpoint answers HTTP 200; callers inspect `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> MigrationResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
}

impl FailureResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<UseCaseError> for FailureResponse {
    fn from(err: UseCaseError) -> Self {
        let message = match &err.details {
            Some(details) => format!("{}: {}", err.message, details),
            None => err.message.clone(),
        };
        Self::new(err.code, message)
    }
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    #[serde(rename = "Synced")]
    Synced,
    #[serde(rename = "Out of sync")]
    OutOfSync,
}

impl SyncStatus {
    /// Equal counts are treated as synced; content is not compared
    pub fn from_counts(database: u64, sheets: u64) -> Self {
        if database == sheets {
            SyncStatus::Synced
        } else {
            SyncStatus::OutOfSync
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideCount {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub database: SideCount,
    pub sheets: SideCount,
    pub sync_status: SyncStatus,
}

// ============================================================================
// Import / export
// ============================================================================

/// Per-row failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub id: String,
    pub row_number: Option<u32>,
    pub error: String,
}

/// Per-row skip with a human-readable reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSkip {
    pub id: String,
    pub row_number: Option<u32>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: u32,
    pub error_details: Vec<RowError>,
    pub skipped_details: Vec<RowSkip>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub synced: u32,
    pub errors: u32,
    pub error_details: Vec<RowError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullMigrationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub imported: u32,
    pub updated: u32,
    pub skipped: u32,
    pub synced: u32,
    /// Import errors plus export errors
    pub errors: u32,
    pub error_details: Vec<RowError>,
    pub skipped_details: Vec<RowSkip>,
}

impl FullMigrationResult {
    pub fn already_synced() -> Self {
        Self {
            message: Some("Already fully synced".to_string()),
            ..Default::default()
        }
    }

    pub fn combine(import: ImportResult, export: SyncResult) -> Self {
        let mut error_details = import.error_details;
        error_details.extend(export.error_details);
        Self {
            message: None,
            imported: import.imported,
            updated: import.updated,
            skipped: import.skipped,
            synced: export.synced,
            errors: import.errors + export.errors,
            error_details,
            skipped_details: import.skipped_details,
        }
    }
}

// ============================================================================
// Compare / columns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDifference {
    pub field: String,
    pub sheet_value: serde_json::Value,
    pub store_value: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comparison {
    /// Raw sheet row, header -> cell
    pub sheets: Option<serde_json::Value>,
    /// Store record, field -> value
    pub database: Option<serde_json::Value>,
    pub differences: Vec<FieldDifference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResult {
    pub comparison: Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub sample: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsResult {
    pub sheet_name: String,
    pub columns: Vec<ColumnInfo>,
}
