//! Serialized schema form
//!
//! ```text
//! { "name": "Examples::User",
//!   "schema_name": "examples.user",
//!   "type": "flexible",
//!   "extras": "raise",
//!   "version": "5c0cb4ff",
//!   "attributes": {
//!     "username": { "type": "string", "required": true, "format": "\\A[a-z]+\\z" },
//!     "tags": { "type": "array", "of": "string" } } }
//! ```
//!
//! `attributes` is written as an ordered object. On input it may also be an
//! array of objects that each carry a `name` key. A nested struct type is
//! written inline as a complete serialized schema in place of the tag.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::attribute::{AttributeDef, TypeSpec};
use crate::structs::{ExtrasPolicy, Variant};

/// A schema in its interchange form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSchema {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<ExtrasPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(
        serialize_with = "serialize_attributes",
        deserialize_with = "deserialize_attributes"
    )]
    pub attributes: Vec<(String, SerializedAttribute)>,
}

impl SerializedSchema {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: JsonValue) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn attribute(&self, name: &str) -> Option<&SerializedAttribute> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }
}

/// Type of a serialized attribute: a registry tag or an inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedType {
    Tag(String),
    Schema(Box<SerializedSchema>),
}

impl SerializedType {
    fn from_spec(spec: &TypeSpec) -> Self {
        match spec {
            TypeSpec::Tag(tag) => SerializedType::Tag(tag.clone()),
            TypeSpec::Struct(st) => SerializedType::Schema(Box::new(st.schema().to_serialized())),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One serialized attribute definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedAttribute {
    #[serde(rename = "type")]
    pub kind: SerializedType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of: Option<SerializedType>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub coercible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        rename = "alias",
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub aliases: Vec<String>,
}

impl SerializedAttribute {
    pub(crate) fn from_def(def: &AttributeDef) -> Self {
        let options = def.options();
        Self {
            kind: SerializedType::from_spec(def.type_spec()),
            of: options.of.as_ref().map(SerializedType::from_spec),
            required: options.required,
            coercible: options.coercible,
            default: options.default.as_ref().map(|d| d.to_json()),
            format: options.format.as_ref().map(|f| f.source().to_string()),
            enum_values: options
                .enum_values
                .as_ref()
                .map(|values| values.iter().map(|v| v.to_json()).collect()),
            min_length: options.min_length,
            max_length: options.max_length,
            description: options.description.clone(),
            aliases: options.aliases.clone(),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(alias) => vec![alias],
        OneOrMany::Many(aliases) => aliases,
    })
}

fn serialize_attributes<S>(
    attributes: &[(String, SerializedAttribute)],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(attributes.len()))?;
    for (name, attribute) in attributes {
        map.serialize_entry(name, attribute)?;
    }
    map.end()
}

fn deserialize_attributes<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, SerializedAttribute)>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(name, value)| -> Result<_, D::Error> {
                let attribute: SerializedAttribute = serde_json::from_value(value)
                    .map_err(|e| de::Error::custom(format!("attribute '{}': {}", name, e)))?;
                Ok((name, attribute))
            })
            .collect(),
        JsonValue::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| -> Result<_, D::Error> {
                let mut object = match item {
                    JsonValue::Object(object) => object,
                    _ => return Err(de::Error::custom(format!("attribute #{} is not an object", i))),
                };
                let name = match object.remove("name") {
                    Some(JsonValue::String(name)) => name,
                    _ => return Err(de::Error::custom(format!("attribute #{} has no name", i))),
                };
                let attribute: SerializedAttribute = serde_json::from_value(JsonValue::Object(object))
                    .map_err(|e| de::Error::custom(format!("attribute '{}': {}", name, e)))?;
                Ok((name, attribute))
            })
            .collect(),
        other => Err(de::Error::custom(format!(
            "attributes must be an object or an array, got {}",
            other
        ))),
    }
}
