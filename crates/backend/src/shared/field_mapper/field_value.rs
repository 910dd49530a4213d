use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A store-side value produced by a coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn from_text(value: Option<String>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }

    pub fn from_number(value: Option<f64>) -> Self {
        value.map(FieldValue::Number).unwrap_or(FieldValue::Null)
    }

    pub fn from_integer(value: Option<i64>) -> Self {
        value.map(FieldValue::Integer).unwrap_or(FieldValue::Null)
    }

    /// Stored dates are ISO strings; anything else stays text
    pub fn from_date_text(value: Option<String>) -> Self {
        match value {
            None => FieldValue::Null,
            Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Text(text)),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::json!(n),
            FieldValue::Integer(n) => serde_json::json!(n),
            FieldValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Store field name -> value, for a partial or full record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<String, FieldValue>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.0.insert(field.into(), value);
    }

    pub fn with(mut self, field: &str, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Overlay `other` onto `self`
    pub fn merge(&mut self, other: FieldValues) {
        self.0.extend(other.0);
    }

    /// `None` when the field is absent, `Some(None)` when it must be cleared
    pub fn text(&self, field: &str) -> Option<Option<String>> {
        self.get(field).map(|value| match value {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        })
    }

    pub fn number(&self, field: &str) -> Option<Option<f64>> {
        self.get(field).map(|value| match value {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Null => None,
            other => {
                tracing::debug!("Field {}: {:?} is not a number, storing null", field, other);
                None
            }
        })
    }

    pub fn integer(&self, field: &str) -> Option<Option<i64>> {
        self.get(field).map(|value| match value {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            FieldValue::Null => None,
            other => {
                tracing::debug!("Field {}: {:?} is not an integer, storing null", field, other);
                None
            }
        })
    }

    /// Dates are stored as YYYY-MM-DD; unparseable text is kept verbatim
    pub fn date(&self, field: &str) -> Option<Option<String>> {
        self.get(field).map(|value| match value {
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Null => None,
            other => {
                tracing::debug!("Field {}: {:?} is not a date, storing null", field, other);
                None
            }
        })
    }
}

impl FromIterator<(String, FieldValue)> for FieldValues {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
