//! Field mapper: spreadsheet column names <-> store field names, with the
//! type coercion each column needs.

pub mod coercion;
pub mod field_value;

use serde_json::Value;

use crate::shared::sheets::record::column_index;
use crate::shared::sheets::SheetRecord;

pub use field_value::{FieldValue, FieldValues};

/// How a column's text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Currency,
    Integer,
    BooleanToInt,
    Date,
    Text,
}

impl FieldKind {
    /// Sheet cell -> store value. Never fails.
    pub fn coerce(self, cell: &Value) -> FieldValue {
        match self {
            FieldKind::Currency => FieldValue::from_number(coercion::currency(cell)),
            FieldKind::Integer => FieldValue::from_integer(coercion::integer(cell)),
            FieldKind::BooleanToInt => FieldValue::from_integer(coercion::boolean_to_int(cell)),
            FieldKind::Date => coercion::date(cell),
            FieldKind::Text => FieldValue::from_text(coercion::identity(cell)),
        }
    }

    /// Store value -> the text written into the sheet. `None` for null.
    pub fn format(self, value: &FieldValue) -> Option<String> {
        match (self, value) {
            (_, FieldValue::Null) => None,
            (FieldKind::BooleanToInt, FieldValue::Integer(1)) => Some("Yes".to_string()),
            (FieldKind::BooleanToInt, FieldValue::Integer(0)) => Some("No".to_string()),
            (_, FieldValue::Date(d)) => Some(d.format("%d/%m/%Y").to_string()),
            (_, FieldValue::Number(n)) => Some(n.to_string()),
            (_, FieldValue::Integer(n)) => Some(n.to_string()),
            (_, FieldValue::Text(s)) => Some(s.clone()),
        }
    }
}

/// One mapping entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub sheet_column: &'static str,
    pub store_field: &'static str,
    pub kind: FieldKind,
    /// Filled by a sheet formula: read from the sheet, never written to it
    pub computed: bool,
}

impl FieldSpec {
    pub const fn new(sheet_column: &'static str, store_field: &'static str, kind: FieldKind) -> Self {
        Self {
            sheet_column,
            store_field,
            kind,
            computed: false,
        }
    }

    pub const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

pub fn find_by_store_field<'a>(fields: &'a [FieldSpec], store_field: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.store_field == store_field)
}

/// Sheet row -> store values. Only columns the row defines are assigned,
/// so a missing column never clears a stored value.
pub fn sheet_to_store(record: &SheetRecord, fields: &[FieldSpec]) -> FieldValues {
    fields
        .iter()
        .filter_map(|spec| {
            record.get(spec.sheet_column).map(|cell| {
                (
                    spec.store_field.to_string(),
                    spec.kind.coerce(&Value::String(cell.to_string())),
                )
            })
        })
        .collect()
}

/// Store values -> (sheet column, cell text). Nulls and computed fields are
/// left out so the sheet keeps what it has.
pub fn store_to_sheet(values: &FieldValues, fields: &[FieldSpec]) -> Vec<(&'static str, String)> {
    fields
        .iter()
        .filter(|spec| !spec.computed)
        .filter_map(|spec| {
            let value = values.get(spec.store_field)?;
            spec.kind.format(value).map(|text| (spec.sheet_column, text))
        })
        .collect()
}

/// Formula-derived values of a row, non-null only
pub fn computed_values(record: &SheetRecord, fields: &[FieldSpec]) -> FieldValues {
    let computed: Vec<FieldSpec> = fields.iter().filter(|f| f.computed).copied().collect();
    sheet_to_store(record, &computed)
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Drop formula-derived fields: only the sheet may set them
pub fn without_computed(values: FieldValues, fields: &[FieldSpec]) -> FieldValues {
    values
        .iter()
        .filter(|(name, _)| {
            !fields
                .iter()
                .any(|spec| spec.computed && spec.store_field == name.as_str())
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Lay cells out along the sheet's header. Columns the header lacks are
/// dropped; untouched positions are `None`.
pub fn layout_row(headers: &[String], cells: &[(&str, String)]) -> Vec<Option<String>> {
    let mut row = vec![None; headers.len()];
    for (column, text) in cells {
        match column_index(headers, column) {
            Some(index) => row[index] = Some(text.clone()),
            None => tracing::debug!("Column '{}' not in sheet header, not written", column),
        }
    }
    row
}
