use crate::domain::common::{EntityMetadata, RecordId, SheetId};
use serde::{Deserialize, Serialize};

/// A loan balance written off as unrecoverable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteOffFields {
    pub loan_id: Option<String>,
    pub borrower_id: Option<String>,
    pub write_off_date: Option<String>,
    pub amount_written_off: Option<f64>,
    pub recovered_amount: Option<f64>,
    pub reason: Option<String>,
    pub approved_by: Option<String>,
    pub board_approved: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOff {
    pub id: RecordId,
    pub sheet_id: Option<SheetId>,
    pub synced: bool,
    pub metadata: EntityMetadata,
    #[serde(flatten)]
    pub fields: WriteOffFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteOffDto {
    pub id: Option<String>,
    pub sheet_id: Option<String>,
    #[serde(flatten)]
    pub fields: WriteOffFields,
}
