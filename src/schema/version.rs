//! Content-derived schema version
//!
//! The version is the lower-case hex CRC32 (IEEE) of a canonical JSON
//! encoding of the attribute map. Only these option keys take part, in this
//! order:
//!
//! `type`, `of`, `required`, `default`, `format`, `enum`, `min_length`,
//! `max_length`
//!
//! Descriptions, aliases and the coercible flag never change the version.
//! Producer defaults hash as `"<proc>"`. A nested struct type hashes as its
//! own version, so a change inside it propagates outward.

use crc32fast::Hasher;
use serde_json::{json, Map, Value as JsonValue};

use super::attribute::{AttributeDef, TypeSpec};

/// Computes the version of an ordered attribute list.
pub fn compute_version(attributes: &[AttributeDef]) -> String {
    let encoded = canonical_json(attributes).to_string();
    format!("{:x}", compute_checksum(encoded.as_bytes()))
}

fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// The hashed view of the attribute map, keyed by attribute name.
pub fn canonical_json(attributes: &[AttributeDef]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|def| (def.name().to_string(), canonical_attribute(def)))
        .collect();
    JsonValue::Object(map)
}

fn canonical_type(spec: &TypeSpec) -> JsonValue {
    match spec {
        TypeSpec::Tag(tag) => JsonValue::String(tag.clone()),
        TypeSpec::Struct(st) => json!({ "struct": st.version() }),
    }
}

fn canonical_attribute(def: &AttributeDef) -> JsonValue {
    let options = def.options();
    let mut map = Map::new();
    map.insert("type".into(), canonical_type(def.type_spec()));
    if let Some(of) = &options.of {
        map.insert("of".into(), canonical_type(of));
    }
    map.insert("required".into(), JsonValue::Bool(options.required));
    if let Some(default) = &options.default {
        map.insert("default".into(), default.to_json());
    }
    if let Some(format) = &options.format {
        map.insert("format".into(), JsonValue::String(format.source().to_string()));
    }
    if let Some(values) = &options.enum_values {
        map.insert(
            "enum".into(),
            JsonValue::Array(values.iter().map(|v| v.to_json()).collect()),
        );
    }
    if let Some(min) = options.min_length {
        map.insert("min_length".into(), JsonValue::from(min));
    }
    if let Some(max) = options.max_length {
        map.insert("max_length".into(), JsonValue::from(max));
    }
    JsonValue::Object(map)
}
