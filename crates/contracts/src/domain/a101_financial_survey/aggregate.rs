use crate::domain::common::{EntityMetadata, RecordId, SheetId};
use serde::{Deserialize, Serialize};

/// Business fields of a borrower's financial survey.
///
/// The last four fields are computed by spreadsheet formulas and only ever
/// flow sheet -> database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSurveyFields {
    pub credit_application_id: Option<String>,
    pub borrower_id: Option<String>,
    pub business_name: Option<String>,
    /// YYYY-MM-DD, or the original text when the sheet value was not a date
    pub survey_date: Option<String>,
    pub monthly_revenue: Option<f64>,
    pub cost_of_goods_sold: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub household_expenses: Option<f64>,
    pub existing_loan_repayments: Option<f64>,
    pub number_of_employees: Option<i64>,
    /// 1 / 0
    pub owns_premises: Option<i64>,
    /// 1 / 0
    pub has_bank_account: Option<i64>,
    pub surveyor_notes: Option<String>,
    pub gross_profit: Option<f64>,
    pub net_disposable_income: Option<f64>,
    pub debt_service_ratio: Option<f64>,
    pub max_affordable_installment: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSurvey {
    pub id: RecordId,
    pub sheet_id: Option<SheetId>,
    pub synced: bool,
    pub metadata: EntityMetadata,
    #[serde(flatten)]
    pub fields: FinancialSurveyFields,
}

/// Create/update payload. `id` present means update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSurveyDto {
    pub id: Option<String>,
    /// Unverified sheet reference supplied by the client; stored as pending
    pub sheet_id: Option<String>,
    #[serde(flatten)]
    pub fields: FinancialSurveyFields,
}
