use contracts::domain::a104_write_off::aggregate::WriteOffFields;
use contracts::domain::common::EntityKind;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repository::Entity;
use crate::shared::field_mapper::{FieldKind, FieldSpec, FieldValue, FieldValues};
use crate::usecases::u601_sheet_migration::{
    Correlation, ExistingRowPolicy, MigrationEntity, RecordStore, SeaOrmStore,
};

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Loan ID", "loan_id", FieldKind::Text),
    FieldSpec::new("Borrower ID", "borrower_id", FieldKind::Text),
    FieldSpec::new("Write-off Date", "write_off_date", FieldKind::Date),
    FieldSpec::new("Amount Written Off", "amount_written_off", FieldKind::Currency),
    FieldSpec::new("Recovered Amount", "recovered_amount", FieldKind::Currency),
    FieldSpec::new("Reason", "reason", FieldKind::Text),
    FieldSpec::new("Approved By", "approved_by", FieldKind::Text),
    FieldSpec::new("Board Approved", "board_approved", FieldKind::BooleanToInt),
];

pub static ENTITY: MigrationEntity = MigrationEntity {
    kind: EntityKind::WriteOff,
    id_prefix: "WO",
    fields: FIELDS,
    correlation: Correlation {
        query_param: "loanId",
        sheet_column: "Loan ID",
        store_field: "loan_id",
    },
    discriminator: "write_off_date",
    existing_row_policy: ExistingRowPolicy::SkipExisting,
    read_back: false,
};

pub fn store(db: DatabaseConnection) -> Arc<dyn RecordStore> {
    Arc::new(SeaOrmStore::<Entity>::new(db, FIELDS))
}

pub fn field_values(f: &WriteOffFields) -> FieldValues {
    FieldValues::new()
        .with("loan_id", FieldValue::from_text(f.loan_id.clone()))
        .with("borrower_id", FieldValue::from_text(f.borrower_id.clone()))
        .with("write_off_date", FieldValue::from_date_text(f.write_off_date.clone()))
        .with("amount_written_off", FieldValue::from_number(f.amount_written_off))
        .with("recovered_amount", FieldValue::from_number(f.recovered_amount))
        .with("reason", FieldValue::from_text(f.reason.clone()))
        .with("approved_by", FieldValue::from_text(f.approved_by.clone()))
        .with("board_approved", FieldValue::from_integer(f.board_approved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_is_mapped() {
        let values = field_values(&WriteOffFields {
            board_approved: Some(1),
            ..Default::default()
        });
        assert_eq!(values.len(), FIELDS.len());
        assert_eq!(values.integer("board_approved"), Some(Some(1)));
    }
}
