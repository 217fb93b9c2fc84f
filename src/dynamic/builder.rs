//! Dynamic schema builder
//!
//! Turns a serialized schema back into a live [`StructType`]. The rebuilt
//! type declares every attribute in the original order with the original
//! options, so its version equals the serialized one whenever the attribute
//! content is the same.
//!
//! Built types are stored in a [`TypeCatalog`] under their fully-qualified
//! name. An existing entry with the same version is reused; otherwise the
//! new type replaces it.

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use super::namespace::TypeCatalog;
use crate::config::Config;
use crate::errors::{FieldStructError, FieldStructResult};
use crate::schema::{
    DefaultValue, Options, Schema, SerializedAttribute, SerializedSchema, SerializedType, TypeSpec,
};
use crate::structs::{ExtrasPolicy, StructType, Variant};
use crate::types::TypeRegistry;
use crate::value::Value;

/// Rebuilds struct types from serialized schemas.
pub struct SchemaBuilder<'a> {
    registry: &'a TypeRegistry,
    catalog: &'a TypeCatalog,
    default_variant: Variant,
    default_extras: ExtrasPolicy,
}

impl SchemaBuilder<'static> {
    /// Builder over the process-wide registry and catalog.
    pub fn global() -> Self {
        SchemaBuilder::new(TypeRegistry::global(), TypeCatalog::global())
    }
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(registry: &'a TypeRegistry, catalog: &'a TypeCatalog) -> Self {
        let config = Config::default();
        Self {
            registry,
            catalog,
            default_variant: config.default_variant,
            default_extras: config.default_extras,
        }
    }

    /// Takes the variant and extras policy used for schemas that omit them
    /// from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.default_variant = config.default_variant;
        self.default_extras = config.default_extras;
        self
    }

    pub fn catalog(&self) -> &TypeCatalog {
        self.catalog
    }

    /// Rebuilds (or reuses) the type described by `source`.
    ///
    /// Without a prefix the type keeps its name and `schema_name`; with a
    /// prefix it is named `<prefix>::<name>` and its `schema_name` is
    /// derived from that. Nested schemas are built first, under the same
    /// prefix.
    ///
    /// # Errors
    ///
    /// - `MalformedSchema` for a blank name
    /// - any declaration error (`UnknownType`, `InvalidAttributeOption`, ...)
    pub fn build(
        &self,
        source: &SerializedSchema,
        prefix: Option<&str>,
    ) -> FieldStructResult<StructType> {
        let name = source.name.trim();
        if name.is_empty() {
            return Err(FieldStructError::malformed("<serialized>", "schema has no name"));
        }
        let full_name = match prefix {
            Some(prefix) => format!("{}::{}", prefix, name),
            None => name.to_string(),
        };

        let mut builder = StructType::builder_in(full_name.as_str(), self.registry)
            .variant(source.variant.unwrap_or(self.default_variant))
            .extras(source.extras.unwrap_or(self.default_extras));
        if prefix.is_none() {
            if let Some(schema_name) = &source.schema_name {
                builder = builder.schema_name(schema_name.as_str());
            }
        }

        for (attr_name, attribute) in &source.attributes {
            let type_spec = self.type_spec(&attribute.kind, prefix)?;
            let options = self.options(attribute, prefix)?;
            builder = builder.attribute(attr_name, type_spec, &[], options)?;
        }

        let candidate = builder.build()?;

        if let Some(expected) = &source.version {
            if expected != candidate.version() {
                warn!(
                    struct_type = %full_name,
                    expected = %expected,
                    actual = %candidate.version(),
                    "serialized version does not match rebuilt schema"
                );
            }
        }

        if let Some(existing) = self.catalog.get(&full_name) {
            if existing.version() == candidate.version() {
                debug!(struct_type = %full_name, version = %existing.version(), "reusing struct type");
                return Ok(existing);
            }
        }

        if let Some(replaced) = self.catalog.insert(&full_name, candidate.clone()) {
            info!(
                struct_type = %full_name,
                from = %replaced.version(),
                to = %candidate.version(),
                "struct type replaced"
            );
        } else {
            info!(struct_type = %full_name, version = %candidate.version(), "struct type built");
        }
        Ok(candidate)
    }

    /// Parses and builds a JSON schema document.
    pub fn build_json(&self, json: &str, prefix: Option<&str>) -> FieldStructResult<StructType> {
        let source = SerializedSchema::from_json(json)
            .map_err(|e| FieldStructError::malformed("<json>", e.to_string()))?;
        self.build(&source, prefix)
    }

    pub fn build_value(&self, json: JsonValue, prefix: Option<&str>) -> FieldStructResult<StructType> {
        let source = SerializedSchema::from_value(json)
            .map_err(|e| FieldStructError::malformed("<json>", e.to_string()))?;
        self.build(&source, prefix)
    }

    /// Rebuilds a type from an existing schema.
    pub fn rebuild(&self, schema: &Schema, prefix: Option<&str>) -> FieldStructResult<StructType> {
        self.build(&schema.to_serialized(), prefix)
    }

    fn type_spec(&self, kind: &SerializedType, prefix: Option<&str>) -> FieldStructResult<TypeSpec> {
        match kind {
            SerializedType::Tag(tag) => Ok(TypeSpec::Tag(tag.clone())),
            SerializedType::Schema(nested) => Ok(TypeSpec::Struct(self.build(nested, prefix)?)),
        }
    }

    fn options(
        &self,
        attribute: &SerializedAttribute,
        prefix: Option<&str>,
    ) -> FieldStructResult<Options> {
        let mut options = Options::new()
            .required(attribute.required)
            .coercible(attribute.coercible)
            .aliases(attribute.aliases.iter().cloned());
        if let Some(of) = &attribute.of {
            options = options.of(self.type_spec(of, prefix)?);
        }
        if let Some(default) = &attribute.default {
            options = options.default_spec(DefaultValue::from_json(default));
        }
        if let Some(values) = &attribute.enum_values {
            options = options.one_of(values.iter().map(Value::from));
        }
        if let Some(format) = &attribute.format {
            options = options.format(format.as_str());
        }
        if let Some(min) = attribute.min_length {
            options = options.min_length(min);
        }
        if let Some(max) = attribute.max_length {
            options = options.max_length(max);
        }
        if let Some(description) = &attribute.description {
            options = options.description(description.as_str());
        }
        Ok(options)
    }
}
