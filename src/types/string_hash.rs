use super::FieldType;
use crate::value::{Value, ValueMap};

/// `string_hash`: a map whose keys and values are all strings.
///
/// An array of alternating keys and values is paired up first; an array of
/// odd length is not convertible.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringHashType;

impl FieldType for StringHashType {
    fn tag(&self) -> &str {
        "string_hash"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Map(map) if map.values().all(|v| matches!(v, Value::String(_))))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::Map(_) | Value::Array(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        match value {
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.to_param_string())))
                    .collect(),
            ),
            Value::Array(items) if items.len() % 2 == 0 => {
                let pairs: ValueMap = items
                    .chunks(2)
                    .map(|pair| {
                        (
                            pair[0].to_param_string(),
                            Value::String(pair[1].to_param_string()),
                        )
                    })
                    .collect();
                Value::Map(pairs)
            }
            _ => Value::Null,
        }
    }
}
