//! Schema metadata: the ordered, versioned attribute set of one struct type.

use std::collections::HashMap;

use tracing::trace;

use super::attribute::{AttributeDef, AttributeOptions};
use super::serialized::{SerializedAttribute, SerializedSchema};
use super::version::compute_version;
use crate::errors::{FieldStructError, FieldStructResult};
use crate::structs::{ExtrasPolicy, Variant};

/// Ordered attribute map plus identity, variant and extras policy.
///
/// Insertion order defines positional construction and default output order.
/// The version is recomputed after every attribute change.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    schema_name: String,
    variant: Variant,
    extras: ExtrasPolicy,
    attributes: Vec<AttributeDef>,
    index: HashMap<String, usize>,
    version: String,
}

impl Schema {
    /// Creates an empty schema; `schema_name` is derived from `name`.
    pub fn new(name: impl Into<String>, variant: Variant, extras: ExtrasPolicy) -> Self {
        let name = name.into();
        let schema_name = derive_schema_name(&name);
        let mut schema = Self {
            name,
            schema_name,
            variant,
            extras,
            attributes: Vec::new(),
            index: HashMap::new(),
            version: String::new(),
        };
        schema.reset_version();
        schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn set_schema_name(&mut self, schema_name: impl Into<String>) {
        self.schema_name = schema_name.into();
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
    }

    pub fn extras(&self) -> ExtrasPolicy {
        self.extras
    }

    pub fn set_extras(&mut self, extras: ExtrasPolicy) {
        self.extras = extras;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    /// Declared position of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(AttributeDef::name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Adds an attribute. Re-declaring a name replaces its definition in
    /// place, keeping the original position.
    pub fn declare(&mut self, def: AttributeDef) {
        match self.index.get(def.name()) {
            Some(&i) => self.attributes[i] = def,
            None => {
                self.index.insert(def.name().to_string(), self.attributes.len());
                self.attributes.push(def);
            }
        }
        self.reset_version();
    }

    /// Changes the options of an existing attribute and bumps the version.
    pub fn update<F>(&mut self, name: &str, f: F) -> FieldStructResult<()>
    where
        F: FnOnce(&mut AttributeOptions),
    {
        let i = self.position(name).ok_or_else(|| FieldStructError::UnknownAttribute {
            struct_name: self.name.clone(),
            attribute: name.to_string(),
        })?;
        f(self.attributes[i].options_mut());
        self.reset_version();
        Ok(())
    }

    /// Recomputes the version from the current attribute content.
    pub fn reset_version(&mut self) -> &str {
        self.version = compute_version(&self.attributes);
        trace!(schema = %self.name, version = %self.version, "schema version recomputed");
        &self.version
    }

    /// Serialized form.
    pub fn to_serialized(&self) -> SerializedSchema {
        SerializedSchema {
            name: self.name.clone(),
            schema_name: Some(self.schema_name.clone()),
            variant: Some(self.variant),
            extras: Some(self.extras),
            version: Some(self.version.clone()),
            attributes: self
                .attributes
                .iter()
                .map(|def| (def.name().to_string(), SerializedAttribute::from_def(def)))
                .collect(),
        }
    }
}

/// Dotted, snake-cased identity of a struct name:
/// `FieldStruct::FlexibleExamples::User` becomes
/// `field_struct.flexible_examples.user`.
pub fn derive_schema_name(name: &str) -> String {
    name.split("::")
        .flat_map(|segment| segment.split('.'))
        .filter(|segment| !segment.is_empty())
        .map(underscore)
        .collect::<Vec<_>>()
        .join(".")
}

/// `HTTPServer2` -> `http_server2`, `FlexibleExamples` -> `flexible_examples`.
fn underscore(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Options;
    use crate::types::TypeRegistry;

    fn def(name: &str, tag: &str, flags: &[&str]) -> AttributeDef {
        AttributeDef::declare(&TypeRegistry::with_builtins(), name, tag.into(), flags, Options::new())
            .unwrap()
    }

    #[test]
    fn test_schema_name_derivation() {
        assert_eq!(
            derive_schema_name("FieldStruct::FlexibleExamples::User"),
            "field_struct.flexible_examples.user"
        );
        assert_eq!(derive_schema_name("Examples.HTTPServer"), "examples.http_server");
        assert_eq!(derive_schema_name("user"), "user");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut schema = Schema::new("Person", Variant::Flexible, ExtrasPolicy::Raise);
        schema.declare(def("last", "string", &[]));
        schema.declare(def("first", "string", &[]));
        schema.declare(def("age", "integer", &[]));
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["last", "first", "age"]);
        assert_eq!(schema.position("age"), Some(2));
    }

    #[test]
    fn test_redeclaration_replaces_in_place() {
        let mut schema = Schema::new("Person", Variant::Flexible, ExtrasPolicy::Raise);
        schema.declare(def("name", "string", &[]));
        schema.declare(def("age", "integer", &[]));
        let before = schema.version().to_string();

        schema.declare(def("name", "string", &["required"]));
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("name"), Some(0));
        assert!(schema.attribute("name").unwrap().is_required());
        assert_ne!(schema.version(), before);
    }

    #[test]
    fn test_update_bumps_version_and_reset_is_idempotent() {
        let mut schema = Schema::new("Person", Variant::Flexible, ExtrasPolicy::Raise);
        schema.declare(def("name", "string", &[]));
        let before = schema.version().to_string();

        schema.update("name", |o| o.max_length = Some(10)).unwrap();
        let after = schema.version().to_string();
        assert_ne!(before, after);
        assert_eq!(schema.reset_version(), after);

        let err = schema.update("missing", |o| o.required = true).unwrap_err();
        assert_eq!(err.code(), "FS_UNKNOWN_ATTRIBUTE");
    }

    #[test]
    fn test_update_order_does_not_matter() {
        let mut a = Schema::new("P", Variant::Flexible, ExtrasPolicy::Raise);
        let mut b = a.clone();
        for schema in [&mut a, &mut b] {
            schema.declare(def("x", "string", &[]));
            schema.declare(def("y", "string", &[]));
        }
        a.update("x", |o| o.required = true).unwrap();
        a.update("y", |o| o.min_length = Some(1)).unwrap();
        b.update("y", |o| o.min_length = Some(1)).unwrap();
        b.update("x", |o| o.required = true).unwrap();
        assert_eq!(a.version(), b.version());
    }
}
