use crate::domain::common::{EntityMetadata, RecordId, SheetId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanFields {
    pub borrower_id: Option<String>,
    pub borrower_name: Option<String>,
    pub credit_application_id: Option<String>,
    pub principal_amount: Option<f64>,
    /// Annual rate in percent
    pub interest_rate: Option<f64>,
    pub term_months: Option<i64>,
    pub disbursement_date: Option<String>,
    pub maturity_date: Option<String>,
    pub outstanding_balance: Option<f64>,
    pub status: Option<String>,
    pub is_restructured: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: RecordId,
    pub sheet_id: Option<SheetId>,
    pub synced: bool,
    pub metadata: EntityMetadata,
    #[serde(flatten)]
    pub fields: LoanFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanDto {
    pub id: Option<String>,
    pub sheet_id: Option<String>,
    #[serde(flatten)]
    pub fields: LoanFields,
}
