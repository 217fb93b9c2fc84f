use serde_json::Value as JsonValue;

use crate::value::Value;

/// Construction input: positional values followed by named values.
///
/// Positional values map to attributes in declaration order; named values
/// are applied afterwards and override them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Appends a named value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            positional: Vec::new(),
            named: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// An object becomes named values, an array positional values, anything
/// else a single positional value.
impl From<JsonValue> for Args {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Object(map) => map.into_iter().collect(),
            JsonValue::Array(items) => Self {
                positional: items.into_iter().map(Value::from).collect(),
                named: Vec::new(),
            },
            JsonValue::Null => Self::default(),
            other => Self::new().arg(other),
        }
    }
}

impl From<Value> for Args {
    fn from(value: Value) -> Self {
        match value {
            Value::Map(map) => map.into_iter().collect(),
            Value::Array(items) => Self {
                positional: items,
                named: Vec::new(),
            },
            Value::Null => Self::default(),
            other => Self::new().arg(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_is_named() {
        let args = Args::from(json!({"b": 1, "a": "x"}));
        assert!(args.positional().is_empty());
        assert_eq!(args.named()[0], ("b".to_string(), Value::Integer(1)));
    }

    #[test]
    fn test_json_array_is_positional() {
        let args = Args::from(json!(["x", 2]));
        assert_eq!(args.positional(), &[Value::from("x"), Value::Integer(2)]);
    }
}
