use contracts::domain::common::EntityKind;

use crate::shared::field_mapper::FieldSpec;

/// What import does with a sheet row whose ID is already in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingRowPolicy {
    /// Overwrite the stored fields from the sheet (`updated`)
    UpdateInPlace,
    /// Leave the record alone (`skipped`, "Already exists")
    SkipExisting,
}

/// Optional filter narrowing a run to related records
#[derive(Debug, Clone, Copy)]
pub struct Correlation {
    /// Query string key, e.g. `borrowerId`
    pub query_param: &'static str,
    pub sheet_column: &'static str,
    pub store_field: &'static str,
}

/// Everything the engine needs to know about one reconciled entity
#[derive(Debug)]
pub struct MigrationEntity {
    pub kind: EntityKind,
    /// Prefix of identifiers allocated for appended rows, e.g. `LN`
    pub id_prefix: &'static str,
    pub fields: &'static [FieldSpec],
    pub correlation: Correlation,
    /// Store field that, with the correlation field, identifies a sheet row
    /// that predates its store record
    pub discriminator: &'static str,
    pub existing_row_policy: ExistingRowPolicy,
    /// Copy formula columns back into the store after an export
    pub read_back: bool,
}

impl MigrationEntity {
    pub fn has_computed_fields(&self) -> bool {
        self.fields.iter().any(|f| f.computed)
    }
}
