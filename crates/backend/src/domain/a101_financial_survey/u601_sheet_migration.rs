use contracts::domain::a101_financial_survey::aggregate::FinancialSurveyFields;
use contracts::domain::common::EntityKind;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repository::Entity;
use crate::shared::field_mapper::{FieldKind, FieldSpec, FieldValue, FieldValues};
use crate::usecases::u601_sheet_migration::{
    Correlation, ExistingRowPolicy, MigrationEntity, RecordStore, SeaOrmStore,
};

/// Sheet column -> store field. The last four are sheet formulas.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Credit Application ID", "credit_application_id", FieldKind::Text),
    FieldSpec::new("Borrower ID", "borrower_id", FieldKind::Text),
    FieldSpec::new("Business Name", "business_name", FieldKind::Text),
    FieldSpec::new("Survey Date", "survey_date", FieldKind::Date),
    FieldSpec::new("Monthly Revenue", "monthly_revenue", FieldKind::Currency),
    FieldSpec::new("Cost of Goods Sold", "cost_of_goods_sold", FieldKind::Currency),
    FieldSpec::new("Operating Expenses", "operating_expenses", FieldKind::Currency),
    FieldSpec::new("Household Expenses", "household_expenses", FieldKind::Currency),
    FieldSpec::new("Existing Loan Repayments", "existing_loan_repayments", FieldKind::Currency),
    FieldSpec::new("Number of Employees", "number_of_employees", FieldKind::Integer),
    FieldSpec::new("Owns Premises", "owns_premises", FieldKind::BooleanToInt),
    FieldSpec::new("Has Bank Account (Y/N)", "has_bank_account", FieldKind::BooleanToInt),
    FieldSpec::new("Surveyor Notes", "surveyor_notes", FieldKind::Text),
    FieldSpec::new("Gross Profit", "gross_profit", FieldKind::Currency).computed(),
    FieldSpec::new("Net Disposable Income", "net_disposable_income", FieldKind::Currency).computed(),
    FieldSpec::new("Debt Service Ratio", "debt_service_ratio", FieldKind::Currency).computed(),
    FieldSpec::new("Max Affordable Installment", "max_affordable_installment", FieldKind::Currency)
        .computed(),
];

pub static ENTITY: MigrationEntity = MigrationEntity {
    kind: EntityKind::FinancialSurvey,
    id_prefix: "FS",
    fields: FIELDS,
    correlation: Correlation {
        query_param: "creditApplicationId",
        sheet_column: "Credit Application ID",
        store_field: "credit_application_id",
    },
    discriminator: "survey_date",
    existing_row_policy: ExistingRowPolicy::SkipExisting,
    read_back: true,
};

pub fn store(db: DatabaseConnection) -> Arc<dyn RecordStore> {
    Arc::new(SeaOrmStore::<Entity>::new(db, FIELDS))
}

pub fn field_values(f: &FinancialSurveyFields) -> FieldValues {
    FieldValues::new()
        .with("credit_application_id", FieldValue::from_text(f.credit_application_id.clone()))
        .with("borrower_id", FieldValue::from_text(f.borrower_id.clone()))
        .with("business_name", FieldValue::from_text(f.business_name.clone()))
        .with("survey_date", FieldValue::from_date_text(f.survey_date.clone()))
        .with("monthly_revenue", FieldValue::from_number(f.monthly_revenue))
        .with("cost_of_goods_sold", FieldValue::from_number(f.cost_of_goods_sold))
        .with("operating_expenses", FieldValue::from_number(f.operating_expenses))
        .with("household_expenses", FieldValue::from_number(f.household_expenses))
        .with("existing_loan_repayments", FieldValue::from_number(f.existing_loan_repayments))
        .with("number_of_employees", FieldValue::from_integer(f.number_of_employees))
        .with("owns_premises", FieldValue::from_integer(f.owns_premises))
        .with("has_bank_account", FieldValue::from_integer(f.has_bank_account))
        .with("surveyor_notes", FieldValue::from_text(f.surveyor_notes.clone()))
        .with("gross_profit", FieldValue::from_number(f.gross_profit))
        .with("net_disposable_income", FieldValue::from_number(f.net_disposable_income))
        .with("debt_service_ratio", FieldValue::from_number(f.debt_service_ratio))
        .with("max_affordable_installment", FieldValue::from_number(f.max_affordable_installment))
}
