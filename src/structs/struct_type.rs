//! Struct types and their declaration builder
//!
//! A [`StructType`] is a cheap, cloneable handle to a finished schema plus an
//! accessor table resolving attribute names and aliases to positions. Types
//! are built once through a [`StructBuilder`] and are read-only afterwards,
//! so a handle can be shared freely across threads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::args::Args;
use super::instance::StructInstance;
use super::variant::{ExtrasPolicy, Variant};
use crate::errors::{FieldStructError, FieldStructResult};
use crate::schema::{AttributeDef, Options, Schema, TypeSpec};
use crate::types::{FieldType, TypeRegistry};
use crate::value::Value;

struct StructTypeInner {
    schema: Schema,
    /// Declarations made on this type itself, in order.
    declared: Vec<AttributeDef>,
    /// Attribute names and aliases to positions.
    accessors: HashMap<String, usize>,
    parent: Option<StructType>,
}

/// A declared struct type.
#[derive(Clone)]
pub struct StructType {
    inner: Arc<StructTypeInner>,
}

impl StructType {
    /// Starts declaring a type against the process-wide registry.
    pub fn builder(name: impl Into<String>) -> StructBuilder<'static> {
        StructBuilder::new(TypeRegistry::global(), name.into(), None)
    }

    /// Starts declaring a type against `registry`.
    pub fn builder_in(name: impl Into<String>, registry: &TypeRegistry) -> StructBuilder<'_> {
        StructBuilder::new(registry, name.into(), None)
    }

    /// Starts declaring a subtype seeded with this type's attributes, variant
    /// and extras policy.
    pub fn derive(&self, name: impl Into<String>) -> StructBuilder<'static> {
        StructBuilder::new(TypeRegistry::global(), name.into(), Some(self.clone()))
    }

    pub fn derive_in<'r>(
        &self,
        name: impl Into<String>,
        registry: &'r TypeRegistry,
    ) -> StructBuilder<'r> {
        StructBuilder::new(registry, name.into(), Some(self.clone()))
    }

    pub fn name(&self) -> &str {
        self.inner.schema.name()
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn version(&self) -> &str {
        self.inner.schema.version()
    }

    pub fn variant(&self) -> Variant {
        self.inner.schema.variant()
    }

    pub fn extras_policy(&self) -> ExtrasPolicy {
        self.inner.schema.extras()
    }

    pub fn parent(&self) -> Option<&StructType> {
        self.inner.parent.as_ref()
    }

    /// This type and its ancestors, root first.
    pub fn lineage(&self) -> Vec<StructType> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(parent) = current {
            chain.push(parent.clone());
            current = parent.parent();
        }
        chain.reverse();
        chain
    }

    /// Attributes declared on this type itself, excluding inherited ones.
    pub fn declared_attributes(&self) -> &[AttributeDef] {
        &self.inner.declared
    }

    /// Position of an attribute name or alias.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.inner.accessors.get(name).copied()
    }

    /// Attribute definition by name or alias.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.resolve(name).map(|i| &self.inner.schema.attributes()[i])
    }

    /// Same declaration: the same handle, or an equal name and version.
    pub fn same_type(&self, other: &StructType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.name() == other.name() && self.version() == other.version())
    }

    /// Whether this type is `other` or descends from it.
    pub fn is_kind_of(&self, other: &StructType) -> bool {
        self.lineage().iter().any(|t| t.same_type(other))
    }

    /// Builds an instance under this type's variant policy.
    ///
    /// # Errors
    ///
    /// - `TooManyArguments` when more positional values than attributes are given
    /// - `UnknownAttribute` / `InvalidKey` from the extras policy
    /// - `Build` when a strict instance does not validate
    pub fn instantiate(&self, args: impl Into<Args>) -> FieldStructResult<StructInstance> {
        StructInstance::build(self.clone(), args.into())
    }

    /// Builds an instance from a JSON object (named values) or array
    /// (positional values).
    pub fn from_json(&self, json: &str) -> FieldStructResult<StructInstance> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        self.instantiate(document)
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructType")
            .field("name", &self.name())
            .field("variant", &self.variant())
            .field("version", &self.version())
            .finish()
    }
}

/// A struct type is itself an attribute type: maps are coerced into
/// instances of it. Nested values keep their validation failures even for
/// strict types; input the type cannot take at all (unknown keys under
/// `raise`, too many positional values) becomes null.
impl FieldType for StructType {
    fn tag(&self) -> &str {
        self.name()
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Struct(instance) if instance.struct_type().is_kind_of(self))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::Map(_) | Value::Struct(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        let args = match value {
            Value::Map(_) => Args::from(value.clone()),
            Value::Struct(other) => Args::from(serde_json::Value::Object(other.to_map())),
            _ => return Value::Null,
        };
        match StructInstance::build_nested(self.clone(), args) {
            Ok(instance) => Value::Struct(Box::new(instance)),
            Err(e) => {
                debug!(struct_type = %self.name(), error = %e, "nested construction failed");
                Value::Null
            }
        }
    }
}

/// Declaration builder for a [`StructType`].
pub struct StructBuilder<'r> {
    registry: &'r TypeRegistry,
    name: String,
    schema_name: Option<String>,
    variant: Variant,
    extras: ExtrasPolicy,
    parent: Option<StructType>,
    declared: Vec<AttributeDef>,
}

impl<'r> StructBuilder<'r> {
    fn new(registry: &'r TypeRegistry, name: String, parent: Option<StructType>) -> Self {
        let (variant, extras) = parent
            .as_ref()
            .map(|p| (p.variant(), p.extras_policy()))
            .unwrap_or((Variant::Flexible, ExtrasPolicy::Raise));
        Self {
            registry,
            name,
            schema_name: None,
            variant,
            extras,
            parent,
            declared: Vec::new(),
        }
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn extras(mut self, extras: ExtrasPolicy) -> Self {
        self.extras = extras;
        self
    }

    /// Overrides the derived dotted identity.
    pub fn schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    /// Declares an attribute. Declaring a name again replaces it.
    pub fn attribute(
        mut self,
        name: &str,
        type_spec: impl Into<TypeSpec>,
        flags: &[&str],
        options: Options,
    ) -> FieldStructResult<Self> {
        let def = AttributeDef::declare(self.registry, name, type_spec.into(), flags, options)?;
        match self.declared.iter().position(|d| d.name() == name) {
            Some(i) => self.declared[i] = def,
            None => self.declared.push(def),
        }
        Ok(self)
    }

    pub fn required(self, name: &str, type_spec: impl Into<TypeSpec>) -> FieldStructResult<Self> {
        self.attribute(name, type_spec, &["required"], Options::new())
    }

    pub fn optional(self, name: &str, type_spec: impl Into<TypeSpec>) -> FieldStructResult<Self> {
        self.attribute(name, type_spec, &["optional"], Options::new())
    }

    /// Finishes the declaration.
    ///
    /// Ancestor declarations are folded root-first, then this type's own, so
    /// the most specific definition of a name wins while keeping the
    /// position of its first declaration.
    pub fn build(self) -> FieldStructResult<StructType> {
        let mut schema = Schema::new(self.name, self.variant, self.extras);
        if let Some(schema_name) = self.schema_name {
            schema.set_schema_name(schema_name);
        }

        let ancestors = self.parent.as_ref().map(StructType::lineage).unwrap_or_default();
        for ancestor in &ancestors {
            for def in ancestor.declared_attributes() {
                schema.declare(def.clone());
            }
        }
        for def in &self.declared {
            schema.declare(def.clone());
        }

        let accessors = build_accessors(&schema)?;

        debug!(
            struct_type = %schema.name(),
            variant = %schema.variant(),
            attributes = schema.len(),
            version = %schema.version(),
            "struct type declared"
        );

        Ok(StructType {
            inner: Arc::new(StructTypeInner {
                schema,
                declared: self.declared,
                accessors,
                parent: self.parent,
            }),
        })
    }
}

fn build_accessors(schema: &Schema) -> FieldStructResult<HashMap<String, usize>> {
    let mut accessors: HashMap<String, usize> = schema
        .attributes()
        .iter()
        .enumerate()
        .map(|(i, def)| (def.name().to_string(), i))
        .collect();

    for (i, def) in schema.attributes().iter().enumerate() {
        for alias in def.aliases() {
            if let Some(&existing) = accessors.get(alias.as_str()) {
                if existing != i {
                    return Err(FieldStructError::invalid_option(
                        def.name(),
                        "alias",
                        format!("'{}' already names another attribute", alias),
                    ));
                }
                continue;
            }
            accessors.insert(alias.clone(), i);
        }
    }
    Ok(accessors)
}
