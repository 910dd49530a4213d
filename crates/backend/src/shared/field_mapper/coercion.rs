//! Sheet cell -> store value coercions.
//!
//! Every function is total: malformed input becomes `None` (or the original
//! text, for dates) and never an error.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::field_value::FieldValue;
use crate::shared::sheets::record::EMPTY_MARKER;

const CURRENCY_SYMBOLS: &[&str] = &["KSh", "Ksh", "KES", "$", "€", "£", "¥"];

/// Excel/Sheets error markers such as `#VALUE!`, `#REF!`, `#N/A`
fn is_error_marker(s: &str) -> bool {
    s.contains('#') || s.contains("VALUE") || s.contains("ERROR")
}

/// Cell as trimmed text; `None` for null, booleans and blanks
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// "KSh 1,234.56" -> 1234.56
pub fn currency(value: &Value) -> Option<f64> {
    if let Value::Number(n) = value {
        return n.as_f64().filter(|f| f.is_finite());
    }
    let text = cell_text(value)?;
    if is_error_marker(&text) {
        tracing::debug!("currency: error marker {:?} -> null", text);
        return None;
    }
    let mut cleaned = text;
    for symbol in CURRENCY_SYMBOLS {
        cleaned = cleaned.replace(symbol, "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            tracing::debug!("currency: cannot parse {:?} -> null", cleaned);
            None
        }
    }
}

/// As [`currency`], truncated towards zero
pub fn integer(value: &Value) -> Option<i64> {
    currency(value).map(|n| n.trunc() as i64)
}

/// Yes/No style flags -> 1/0
pub fn boolean_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            match s.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(1),
                "false" | "no" | "n" | "0" | EMPTY_MARKER => Some(0),
                other => {
                    let parsed = other.parse::<i64>().ok();
                    if parsed.is_none() {
                        tracing::debug!("boolean_to_int: cannot parse {:?} -> null", s);
                    }
                    parsed
                }
            }
        }
        _ => None,
    }
}

/// Day-first dates. Text that no format accepts is returned unchanged.
pub fn date(value: &Value) -> FieldValue {
    if let Value::Number(n) = value {
        return n
            .as_f64()
            .and_then(serial_to_date)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null);
    }
    let Some(text) = cell_text(value) else {
        return FieldValue::Null;
    };
    if text == EMPTY_MARKER {
        return FieldValue::Null;
    }
    match parse_date(&text) {
        Some(d) => FieldValue::Date(d),
        None => {
            tracing::debug!("date: keeping unparseable value {:?} as text", text);
            FieldValue::Text(text)
        }
    }
}

/// Free text; blanks and the empty marker become `None`
pub fn identity(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        other => cell_text(other).filter(|s| s != EMPTY_MARKER),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    // DD/MM/YYYY takes precedence over every other reading
    if let Ok(d) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Some(d);
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%d %B %Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
    ];
    if let Some(d) = FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    // Unformatted date cells come through as day serials
    text.parse::<f64>().ok().and_then(serial_to_date)
}

/// Spreadsheet day serial (days since 1899-12-30)
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}
