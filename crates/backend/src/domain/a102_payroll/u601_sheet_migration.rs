use contracts::domain::a102_payroll::aggregate::PayrollFields;
use contracts::domain::common::EntityKind;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repository::Entity;
use crate::shared::field_mapper::{FieldKind, FieldSpec, FieldValue, FieldValues};
use crate::usecases::u601_sheet_migration::{
    Correlation, ExistingRowPolicy, MigrationEntity, RecordStore, SeaOrmStore,
};

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Staff ID", "staff_id", FieldKind::Text),
    FieldSpec::new("Staff Name", "staff_name", FieldKind::Text),
    FieldSpec::new("Role", "role", FieldKind::Text),
    FieldSpec::new("Pay Period", "pay_period", FieldKind::Text),
    FieldSpec::new("Basic Salary", "basic_salary", FieldKind::Currency),
    FieldSpec::new("Allowances", "allowances", FieldKind::Currency),
    FieldSpec::new("Deductions", "deductions", FieldKind::Currency),
    FieldSpec::new("Net Pay", "net_pay", FieldKind::Currency),
    FieldSpec::new("Days Worked", "days_worked", FieldKind::Integer),
    FieldSpec::new("Paid (Y/N)", "paid", FieldKind::BooleanToInt),
    FieldSpec::new("Payment Date", "payment_date", FieldKind::Date),
];

/// One row per staff member and pay period
pub static ENTITY: MigrationEntity = MigrationEntity {
    kind: EntityKind::Payroll,
    id_prefix: "PR",
    fields: FIELDS,
    correlation: Correlation {
        query_param: "staffId",
        sheet_column: "Staff ID",
        store_field: "staff_id",
    },
    discriminator: "pay_period",
    existing_row_policy: ExistingRowPolicy::SkipExisting,
    read_back: false,
};

pub fn store(db: DatabaseConnection) -> Arc<dyn RecordStore> {
    Arc::new(SeaOrmStore::<Entity>::new(db, FIELDS))
}

pub fn field_values(f: &PayrollFields) -> FieldValues {
    FieldValues::new()
        .with("staff_id", FieldValue::from_text(f.staff_id.clone()))
        .with("staff_name", FieldValue::from_text(f.staff_name.clone()))
        .with("role", FieldValue::from_text(f.role.clone()))
        .with("pay_period", FieldValue::from_text(f.pay_period.clone()))
        .with("basic_salary", FieldValue::from_number(f.basic_salary))
        .with("allowances", FieldValue::from_number(f.allowances))
        .with("deductions", FieldValue::from_number(f.deductions))
        .with("net_pay", FieldValue::from_number(f.net_pay))
        .with("days_worked", FieldValue::from_integer(f.days_worked))
        .with("paid", FieldValue::from_integer(f.paid))
        .with("payment_date", FieldValue::from_date_text(f.payment_date.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_is_mapped() {
        let values = field_values(&PayrollFields::default());
        assert_eq!(values.len(), FIELDS.len());
        assert!(FIELDS.iter().all(|f| values.contains(f.store_field)));
    }
}
