use serde::{Deserialize, Serialize};

/// Spreadsheet-side identifier stored on a record.
///
/// `Durable` ids were read from (or written to) the `ID` column of the sheet.
/// `Pending` ids are local placeholders that have never been confirmed by the
/// sheet; export never trusts them and re-links the record instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SheetId {
    Durable(String),
    Pending(String),
}

impl SheetId {
    pub fn durable(value: impl Into<String>) -> Self {
        SheetId::Durable(value.into())
    }

    pub fn pending(value: impl Into<String>) -> Self {
        SheetId::Pending(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            SheetId::Durable(v) | SheetId::Pending(v) => v,
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, SheetId::Durable(_))
    }

    /// Durable value, if any
    pub fn durable_value(&self) -> Option<&str> {
        match self {
            SheetId::Durable(v) => Some(v),
            SheetId::Pending(_) => None,
        }
    }

    /// Rebuild from the persisted pair (`sheet_id`, `sheet_id_pending`)
    pub fn from_columns(value: Option<String>, pending: bool) -> Option<Self> {
        let value = value.filter(|v| !v.trim().is_empty())?;
        Some(if pending {
            SheetId::Pending(value)
        } else {
            SheetId::Durable(value)
        })
    }
}

impl std::fmt::Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetId::Durable(v) => write!(f, "{}", v),
            SheetId::Pending(v) => write!(f, "{} (pending)", v),
        }
    }
}
