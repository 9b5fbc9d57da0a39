use std::fmt;

use serde_json::{Map, Number, Value};

/// One dataset row: field name ➜ arbitrary JSON value, in file order.
pub type Record = Map<String, Value>;

/// Join key taken from a record's key field.
///
/// Keys compare by JSON value, so `1` and `"1"` are distinct identifiers.
/// Numbers compare by numeric value: `1`, `1.0` and `1e0` are one key, and
/// integers of any size stay exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    // Null means "no identifier"
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(Self(canonical_number(n))),
            other => Some(Self(other.to_string())),
        }
    }

    /// Read `key_field` from `record`; `None` when absent or null.
    pub fn of(record: &Record, key_field: &str) -> Option<Self> {
        record.get(key_field).and_then(Self::from_value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Integer literals keep their exact digits; anything with a fraction or
// exponent is read as f64 and, when integral, written out in full so it
// lines up with the matching integer literal.
fn canonical_number(n: &Number) -> String {
    let text = n.to_string();
    if !text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        return if text == "-0" { "0".to_string() } else { text };
    }
    match text.parse::<f64>() {
        Ok(f) if f == 0.0 => "0".to_string(),
        Ok(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Ok(f) => f.to_string(),
        Err(_) => text,
    }
}

/// Field names of the first record, used as the dataset's schema.
pub fn representative_fields(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default()
}
