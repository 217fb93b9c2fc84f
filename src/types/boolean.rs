use super::FieldType;
use crate::value::Value;

const FALSY: [&str; 4] = ["0", "f", "false", "off"];

/// `boolean`: only the two literals are native. Strings and integers are
/// stringified, trimmed and lower-cased, then tested against the falsy set;
/// anything outside it is `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl FieldType for BooleanType {
    fn tag(&self) -> &str {
        "boolean"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::String(_) | Value::Integer(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        let text = value.to_param_string().trim().to_lowercase();
        if text.is_empty() {
            return Value::Null;
        }
        Value::Bool(!FALSY.contains(&text.as_str()))
    }
}
