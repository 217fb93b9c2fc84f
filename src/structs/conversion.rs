//! Instance output: ordered maps, JSON and query strings.

use serde_json::{Map, Value as JsonValue};

use super::instance::StructInstance;

/// Controls [`StructInstance::to_map_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Append captured extras after the declared attributes.
    pub include_extras: bool,
    /// Drop null values.
    pub compact: bool,
}

impl StructInstance {
    /// Attribute name to value in declaration order; nested instances are
    /// expanded recursively.
    pub fn to_map(&self) -> Map<String, JsonValue> {
        self.to_map_with(MapOptions::default())
    }

    pub fn to_map_with(&self, options: MapOptions) -> Map<String, JsonValue> {
        let declared = self.iter().map(|(name, value)| (name, value.to_json()));
        let extras = self
            .extras()
            .iter()
            .filter(|_| options.include_extras)
            .map(|(name, value)| (name.as_str(), value.to_json()));

        declared
            .chain(extras)
            .filter(|(_, v)| !(options.compact && v.is_null()))
            .map(|(name, v)| (name.to_string(), v))
            .collect()
    }

    /// Compact JSON, keys in declaration order.
    pub fn to_json(&self) -> String {
        JsonValue::Object(self.to_map()).to_string()
    }

    /// `key=value` pairs joined with `&`. Arrays use `key[]`, nested maps
    /// `key[sub]`; nulls render as `key=`. Pairs are sorted unless the
    /// enclosing key is an array key.
    pub fn to_query(&self) -> String {
        map_query(&self.to_map(), None)
    }
}

fn escape(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

fn map_query(map: &Map<String, JsonValue>, namespace: Option<&str>) -> String {
    if map.is_empty() {
        return namespace.map(|ns| format!("{}=", escape(ns))).unwrap_or_default();
    }

    let mut parts: Vec<String> = map
        .iter()
        .map(|(key, value)| {
            let key = match namespace {
                Some(ns) => format!("{}[{}]", ns, key),
                None => key.clone(),
            };
            value_query(value, &key)
        })
        .filter(|part| !part.is_empty())
        .collect();

    if !namespace.map_or(false, |ns| ns.contains("[]")) {
        parts.sort();
    }
    parts.join("&")
}

fn value_query(value: &JsonValue, key: &str) -> String {
    match value {
        JsonValue::Object(map) => map_query(map, Some(key)),
        JsonValue::Array(items) => {
            let prefix = format!("{}[]", key);
            if items.is_empty() {
                return format!("{}=", escape(&prefix));
            }
            items
                .iter()
                .map(|item| value_query(item, &prefix))
                .collect::<Vec<_>>()
                .join("&")
        }
        JsonValue::Null => format!("{}=", escape(key)),
        JsonValue::String(s) => format!("{}={}", escape(key), escape(s)),
        other => format!("{}={}", escape(key), escape(&other.to_string())),
    }
}
