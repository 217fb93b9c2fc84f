//! Loosely-typed runtime values
//!
//! Instances store one [`Value`] per declared attribute. Input arrives as
//! values (or JSON converted into values); coercion turns them into the
//! native representation of the attribute's type.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::structs::StructInstance;

/// Format used when a date is rendered as a string.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format used when a time of day is rendered as a string.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// String-keyed map that keeps insertion order.
pub type ValueMap = IndexMap<String, Value>;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    Array(Vec<Value>),
    Map(ValueMap),
    Struct(Box<StructInstance>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, or a string that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_present(&self) -> bool {
        !self.is_blank()
    }

    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructInstance> {
        match self {
            Value::Struct(instance) => Some(instance),
            _ => None,
        }
    }

    /// String form used by format checks, string coercion and query output.
    ///
    /// Null renders as the empty string; collections render as JSON.
    pub fn to_param_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::Time(t) => t.format(TIME_FORMAT).to_string(),
            Value::Array(_) | Value::Map(_) | Value::Struct(_) => self.to_json().to_string(),
        }
    }

    /// Length used by `min_length`/`max_length` checks.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            Value::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Converts into JSON. Nested struct instances expand into objects in
    /// declaration order; non-finite floats become null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(_) | Value::DateTime(_) | Value::Time(_) => {
                JsonValue::String(self.to_param_string())
            }
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Struct(instance) => JsonValue::Object(instance.to_map()),
        }
    }
}

/// Renders floats the way a decimal literal reads: `50.0`, `12345.67`.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_param_string()),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        Value::from(json.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<StructInstance> for Value {
    fn from(instance: StructInstance) -> Self {
        Value::Struct(Box::new(instance))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::from("   \t").is_blank());
        assert!(!Value::from(" a ").is_blank());
        assert!(!Value::Bool(false).is_blank());
        assert!(!Value::Integer(0).is_blank());
    }

    #[test]
    fn test_json_numbers_keep_integer_kind() {
        assert_eq!(Value::from(json!(25)), Value::Integer(25));
        assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
    }

    #[test]
    fn test_param_string_forms() {
        assert_eq!(Value::Float(50.0).to_param_string(), "50.0");
        assert_eq!(Value::Float(12345.67).to_param_string(), "12345.67");
        let date = NaiveDate::from_ymd_opt(2018, 3, 24).unwrap();
        assert_eq!(Value::Date(date).to_param_string(), "2018-03-24");
        assert_eq!(Value::Null.to_param_string(), "");
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(Value::from("héllo").length(), Some(5));
        assert_eq!(Value::from(vec!["a", "b"]).length(), Some(2));
        assert_eq!(Value::Integer(3).length(), None);
    }

    #[test]
    fn test_json_round_trip_of_plain_values() {
        let json = json!({"a": [1, "x", null], "b": true});
        assert_eq!(Value::from(json.clone()).to_json(), json);
    }
}
