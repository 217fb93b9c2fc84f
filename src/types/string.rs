use super::FieldType;
use crate::value::Value;

/// `string`: scalars and temporal values are formatted, collections are not
/// convertible.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl FieldType for StringType {
    fn tag(&self) -> &str {
        "string"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::String(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        !matches!(value, Value::Array(_) | Value::Map(_) | Value::Struct(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        Value::String(value.to_param_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_scalars_are_formatted() {
        assert_eq!(StringType.coerce(&Value::Integer(42)), Value::from("42"));
        assert_eq!(StringType.coerce(&Value::Float(2.5)), Value::from("2.5"));
        assert_eq!(StringType.coerce(&Value::Bool(true)), Value::from("true"));
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(StringType.coerce(&Value::Date(date)), Value::from("2020-01-02"));
    }

    #[test]
    fn test_collections_are_not_coercible() {
        let array = Value::from(vec!["a"]);
        assert!(!StringType.coercible(&array));
        assert_eq!(StringType.coerce(&array), Value::Null);
    }

    #[test]
    fn test_null_stays_null() {
        assert!(!StringType.coercible(&Value::Null));
        assert_eq!(StringType.coerce(&Value::Null), Value::Null);
    }
}
