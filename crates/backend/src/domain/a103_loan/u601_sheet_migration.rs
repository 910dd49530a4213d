use contracts::domain::a103_loan::aggregate::LoanFields;
use contracts::domain::common::EntityKind;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repository::Entity;
use crate::shared::field_mapper::{FieldKind, FieldSpec, FieldValue, FieldValues};
use crate::usecases::u601_sheet_migration::{
    Correlation, ExistingRowPolicy, MigrationEntity, RecordStore, SeaOrmStore,
};

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Borrower ID", "borrower_id", FieldKind::Text),
    FieldSpec::new("Borrower Name", "borrower_name", FieldKind::Text),
    FieldSpec::new("Credit Application ID", "credit_application_id", FieldKind::Text),
    FieldSpec::new("Principal Amount", "principal_amount", FieldKind::Currency),
    FieldSpec::new("Interest Rate (%)", "interest_rate", FieldKind::Currency),
    FieldSpec::new("Term (Months)", "term_months", FieldKind::Integer),
    FieldSpec::new("Disbursement Date", "disbursement_date", FieldKind::Date),
    FieldSpec::new("Maturity Date", "maturity_date", FieldKind::Date),
    FieldSpec::new("Outstanding Balance", "outstanding_balance", FieldKind::Currency),
    FieldSpec::new("Status", "status", FieldKind::Text),
    FieldSpec::new("Is Restructured", "is_restructured", FieldKind::BooleanToInt),
];

/// Loans are the one entity whose sheet rows overwrite the store on import
pub static ENTITY: MigrationEntity = MigrationEntity {
    kind: EntityKind::Loan,
    id_prefix: "LN",
    fields: FIELDS,
    correlation: Correlation {
        query_param: "borrowerId",
        sheet_column: "Borrower ID",
        store_field: "borrower_id",
    },
    discriminator: "credit_application_id",
    existing_row_policy: ExistingRowPolicy::UpdateInPlace,
    read_back: false,
};

pub fn store(db: DatabaseConnection) -> Arc<dyn RecordStore> {
    Arc::new(SeaOrmStore::<Entity>::new(db, FIELDS))
}

pub fn field_values(f: &LoanFields) -> FieldValues {
    FieldValues::new()
        .with("borrower_id", FieldValue::from_text(f.borrower_id.clone()))
        .with("borrower_name", FieldValue::from_text(f.borrower_name.clone()))
        .with("credit_application_id", FieldValue::from_text(f.credit_application_id.clone()))
        .with("principal_amount", FieldValue::from_number(f.principal_amount))
        .with("interest_rate", FieldValue::from_number(f.interest_rate))
        .with("term_months", FieldValue::from_integer(f.term_months))
        .with("disbursement_date", FieldValue::from_date_text(f.disbursement_date.clone()))
        .with("maturity_date", FieldValue::from_date_text(f.maturity_date.clone()))
        .with("outstanding_balance", FieldValue::from_number(f.outstanding_balance))
        .with("status", FieldValue::from_text(f.status.clone()))
        .with("is_restructured", FieldValue::from_integer(f.is_restructured))
}
