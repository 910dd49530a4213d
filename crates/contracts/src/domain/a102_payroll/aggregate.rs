use crate::domain::common::{EntityMetadata, RecordId, SheetId};
use serde::{Deserialize, Serialize};

/// One payroll line: a staff member's pay for one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollFields {
    pub staff_id: Option<String>,
    pub staff_name: Option<String>,
    pub role: Option<String>,
    /// Free text as entered in the sheet, e.g. "2024-05" or "May 2024"
    pub pay_period: Option<String>,
    pub basic_salary: Option<f64>,
    pub allowances: Option<f64>,
    pub deductions: Option<f64>,
    pub net_pay: Option<f64>,
    pub days_worked: Option<i64>,
    pub paid: Option<i64>,
    pub payment_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payroll {
    pub id: RecordId,
    pub sheet_id: Option<SheetId>,
    pub synced: bool,
    pub metadata: EntityMetadata,
    #[serde(flatten)]
    pub fields: PayrollFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollDto {
    pub id: Option<String>,
    pub sheet_id: Option<String>,
    #[serde(flatten)]
    pub fields: PayrollFields,
}
