use super::FieldType;
use crate::value::Value;

/// `integer`: floats truncate toward zero, numeric strings parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl FieldType for IntegerType {
    fn tag(&self) -> &str {
        "integer"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Integer(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::Float(_) | Value::String(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        match value {
            Value::Float(f) => truncate(*f),
            Value::String(s) => parse(s.trim()),
            _ => Value::Null,
        }
    }
}

fn truncate(f: f64) -> Value {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Value::Integer(f.trunc() as i64)
    } else {
        Value::Null
    }
}

fn parse(s: &str) -> Value {
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    match s.parse::<f64>() {
        Ok(f) => truncate(f),
        Err(_) => Value::Null,
    }
}
