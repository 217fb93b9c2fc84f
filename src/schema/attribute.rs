//! Attribute definitions
//!
//! An attribute is declared with a type (a registry tag or a nested struct
//! type), zero or more shorthand flags and an [`Options`] bag. Declaration
//! resolves the type against a [`TypeRegistry`] and checks the options once,
//! so instances never see an unresolved or inconsistent definition.

use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::errors::{FieldStructError, FieldStructResult};
use crate::structs::StructType;
use crate::types::{FieldType, TypeRegistry};
use crate::value::Value;

/// Marker that stands in for a producer default in hashed and serialized
/// forms.
pub const PROC_MARKER: &str = "<proc>";

/// Declared type of an attribute or of its elements.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A type registered under this tag.
    Tag(String),
    /// A nested struct type.
    Struct(StructType),
}

impl TypeSpec {
    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            TypeSpec::Struct(st) => Some(st),
            TypeSpec::Tag(_) => None,
        }
    }

    /// Tag or struct name, for log fields and messages.
    pub fn label(&self) -> &str {
        match self {
            TypeSpec::Tag(tag) => tag,
            TypeSpec::Struct(st) => st.name(),
        }
    }

    fn resolve(&self, registry: &TypeRegistry) -> FieldStructResult<Arc<dyn FieldType>> {
        match self {
            TypeSpec::Tag(tag) => registry.lookup(tag),
            TypeSpec::Struct(st) => Ok(Arc::new(st.clone())),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(tag: &str) -> Self {
        TypeSpec::Tag(tag.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(tag: String) -> Self {
        TypeSpec::Tag(tag)
    }
}

impl From<StructType> for TypeSpec {
    fn from(st: StructType) -> Self {
        TypeSpec::Struct(st)
    }
}

impl From<&StructType> for TypeSpec {
    fn from(st: &StructType) -> Self {
        TypeSpec::Struct(st.clone())
    }
}

type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default applied to attributes absent from construction input.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value, cloned into every instance.
    Value(Value),
    /// Invoked with no arguments on every construction.
    Producer(Producer),
    /// A producer lost in serialization. Hashes like a producer but yields
    /// no value.
    Detached,
}

impl DefaultValue {
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Producer(Arc::new(f))
    }

    /// Value to assign, re-invoking producers each time.
    pub fn produce(&self) -> Option<Value> {
        match self {
            DefaultValue::Value(v) => Some(v.clone()),
            DefaultValue::Producer(f) => Some(f()),
            DefaultValue::Detached => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            DefaultValue::Value(v) => v.to_json(),
            DefaultValue::Producer(_) | DefaultValue::Detached => {
                JsonValue::String(PROC_MARKER.to_string())
            }
        }
    }

    /// Inverse of [`DefaultValue::to_json`]; the marker becomes `Detached`.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::String(s) if s == PROC_MARKER => DefaultValue::Detached,
            other => DefaultValue::Value(Value::from(other)),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
            DefaultValue::Detached => f.write_str("Detached"),
        }
    }
}

/// A compiled `format` option that remembers its source.
#[derive(Debug, Clone)]
pub struct FormatPattern {
    source: String,
    regex: Regex,
}

impl FormatPattern {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as `=~` would do.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for FormatPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Declaration options as supplied by the caller. Every field left unset
/// falls back to the flags and then to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct Options {
    required: Option<bool>,
    coercible: Option<bool>,
    default: Option<DefaultValue>,
    enum_values: Option<Vec<Value>>,
    format: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    of: Option<TypeSpec>,
    description: Option<String>,
    aliases: Vec<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// `optional(true)` is `required(false)`.
    pub fn optional(mut self, optional: bool) -> Self {
        self.required = Some(!optional);
        self
    }

    pub fn coercible(mut self, coercible: bool) -> Self {
        self.coercible = Some(coercible);
        self
    }

    /// Fixed default (the `default` option).
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub(crate) fn default_spec(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Default produced by calling `f` on every construction.
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::producer(f));
        self
    }

    /// Allowed values (the `enum` option).
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn format(mut self, pattern: impl Into<String>) -> Self {
        self.format = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Expands a range into `min_length`/`max_length`.
    pub fn length(mut self, range: impl RangeBounds<usize>) -> Self {
        self.min_length = match range.start_bound() {
            Bound::Included(n) => Some(*n),
            Bound::Excluded(n) => Some(n.saturating_add(1)),
            Bound::Unbounded => None,
        };
        self.max_length = match range.end_bound() {
            Bound::Included(n) => Some(*n),
            Bound::Excluded(n) => Some(n.saturating_sub(1)),
            Bound::Unbounded => None,
        };
        self
    }

    /// Element type of an `array` attribute.
    pub fn of(mut self, element: impl Into<TypeSpec>) -> Self {
        self.of = Some(element.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}

/// Shorthand declaration flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Required,
    Optional,
    Coercible,
    /// Non-coercible.
    Strict,
}

impl Flag {
    pub fn parse(flag: &str) -> FieldStructResult<Self> {
        match flag {
            "required" => Ok(Flag::Required),
            "optional" => Ok(Flag::Optional),
            "coercible" => Ok(Flag::Coercible),
            "strict" => Ok(Flag::Strict),
            other => Err(FieldStructError::UnknownAttributeOption(other.to_string())),
        }
    }
}

/// Resolved option bag of a declared attribute.
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    pub required: bool,
    pub coercible: bool,
    pub default: Option<DefaultValue>,
    pub enum_values: Option<Vec<Value>>,
    pub format: Option<FormatPattern>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub of: Option<TypeSpec>,
    pub description: Option<String>,
    pub aliases: Vec<String>,
}

impl AttributeOptions {
    fn resolve(attribute: &str, flags: &[&str], options: Options) -> FieldStructResult<Self> {
        let mut required = None;
        let mut coercible = None;
        for flag in flags {
            match Flag::parse(flag)? {
                Flag::Required => required = Some(true),
                Flag::Optional => required = Some(false),
                Flag::Coercible => coercible = Some(true),
                Flag::Strict => coercible = Some(false),
            }
        }

        let format = match options.format {
            Some(source) => {
                let regex = Regex::new(&source).map_err(|e| {
                    FieldStructError::invalid_option(attribute, "format", e.to_string())
                })?;
                Some(FormatPattern { source, regex })
            }
            None => None,
        };

        if let (Some(min), Some(max)) = (options.min_length, options.max_length) {
            if min > max {
                return Err(FieldStructError::invalid_option(
                    attribute,
                    "length",
                    format!("min_length {} exceeds max_length {}", min, max),
                ));
            }
        }

        Ok(Self {
            required: options.required.or(required).unwrap_or(false),
            coercible: options.coercible.or(coercible).unwrap_or(false),
            default: options.default,
            enum_values: options.enum_values,
            format,
            min_length: options.min_length,
            max_length: options.max_length,
            of: options.of,
            description: options.description,
            aliases: options.aliases,
        })
    }
}

/// One declared attribute: name, type and resolved options.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    name: String,
    type_spec: TypeSpec,
    runtime: Arc<dyn FieldType>,
    options: AttributeOptions,
}

impl AttributeDef {
    /// Resolves a declaration against `registry`.
    ///
    /// # Errors
    ///
    /// - `UnknownType` for an unregistered tag (attribute or `of`)
    /// - `UnknownAttributeOption` for an unrecognized flag
    /// - `InvalidAttributeOption` for an array without `of`, an `of` on a
    ///   non-container type, a bad `format` pattern or inverted length bounds
    pub fn declare(
        registry: &TypeRegistry,
        name: &str,
        type_spec: TypeSpec,
        flags: &[&str],
        options: Options,
    ) -> FieldStructResult<Self> {
        let options = AttributeOptions::resolve(name, flags, options)?;
        let base = type_spec.resolve(registry)?;

        let runtime = match &options.of {
            Some(element) => {
                let element = element.resolve(registry)?;
                base.with_element(element).ok_or_else(|| {
                    FieldStructError::invalid_option(
                        name,
                        "of",
                        format!("type '{}' takes no element type", type_spec.label()),
                    )
                })?
            }
            None if base.requires_element() => {
                return Err(FieldStructError::invalid_option(
                    name,
                    "of",
                    format!("type '{}' requires an element type", type_spec.label()),
                ));
            }
            None => base,
        };

        Ok(Self {
            name: name.to_string(),
            type_spec,
            runtime,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_spec(&self) -> &TypeSpec {
        &self.type_spec
    }

    /// The resolved type used for coercion and the native check.
    pub fn field_type(&self) -> &Arc<dyn FieldType> {
        &self.runtime
    }

    pub fn options(&self) -> &AttributeOptions {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut AttributeOptions {
        &mut self.options
    }

    pub fn is_required(&self) -> bool {
        self.options.required
    }

    pub fn is_coercible(&self) -> bool {
        self.options.coercible
    }

    pub fn aliases(&self) -> &[String] {
        &self.options.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.options.description.as_deref()
    }

    /// Whether values are nested struct instances (directly or as elements).
    pub fn is_structural(&self) -> bool {
        self.type_spec.as_struct().is_some()
            || self.options.of.as_ref().and_then(TypeSpec::as_struct).is_some()
    }

    /// Value stored on assignment: coerced when the attribute is coercible
    /// or holds nested structs, otherwise the raw input.
    pub fn prepare(&self, raw: Value) -> Value {
        if self.options.coercible || self.is_structural() {
            self.runtime.coerce(&raw)
        } else {
            raw
        }
    }

    /// Default for an unassigned attribute, already prepared.
    pub fn default_value(&self) -> Option<Value> {
        self.options
            .default
            .as_ref()
            .and_then(DefaultValue::produce)
            .map(|v| self.prepare(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::with_builtins()
    }

    #[test]
    fn test_flags_merge_into_options() {
        let def =
            AttributeDef::declare(&registry(), "age", "integer".into(), &["required", "coercible"], Options::new())
                .unwrap();
        assert!(def.is_required());
        assert!(def.is_coercible());
    }

    #[test]
    fn test_explicit_options_win_over_flags() {
        let def = AttributeDef::declare(
            &registry(),
            "age",
            "integer".into(),
            &["required"],
            Options::new().optional(true),
        )
        .unwrap();
        assert!(!def.is_required());
    }

    #[test]
    fn test_unknown_flag_fails() {
        let err = AttributeDef::declare(&registry(), "age", "integer".into(), &["loud"], Options::new())
            .unwrap_err();
        assert_eq!(err.code(), "FS_UNKNOWN_ATTRIBUTE_OPTION");
        assert_eq!(err.to_string(), "Unknown option for attribute [loud]");
    }

    #[test]
    fn test_unknown_type_fails() {
        let err = AttributeDef::declare(&registry(), "x", "dancing".into(), &[], Options::new())
            .unwrap_err();
        assert_eq!(err.code(), "FS_UNKNOWN_TYPE");
    }

    #[test]
    fn test_length_range_expands() {
        let def = AttributeDef::declare(
            &registry(),
            "name",
            "string".into(),
            &[],
            Options::new().length(3..=20),
        )
        .unwrap();
        assert_eq!(def.options().min_length, Some(3));
        assert_eq!(def.options().max_length, Some(20));

        let half_open = Options::new().length(2..5);
        let def = AttributeDef::declare(&registry(), "n", "string".into(), &[], half_open).unwrap();
        assert_eq!(def.options().max_length, Some(4));
    }

    #[test]
    fn test_array_requires_element_type() {
        let err = AttributeDef::declare(&registry(), "tags", "array".into(), &[], Options::new())
            .unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_ATTRIBUTE_OPTION");

        let def = AttributeDef::declare(
            &registry(),
            "tags",
            "array".into(),
            &["coercible"],
            Options::new().of("integer"),
        )
        .unwrap();
        assert_eq!(def.prepare(Value::from("4")), Value::from(vec![4i64]));
    }

    #[test]
    fn test_element_type_on_scalar_fails() {
        let err = AttributeDef::declare(
            &registry(),
            "name",
            "string".into(),
            &[],
            Options::new().of("integer"),
        )
        .unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_ATTRIBUTE_OPTION");
    }

    #[test]
    fn test_bad_format_and_inverted_length_fail() {
        let err = AttributeDef::declare(&registry(), "x", "string".into(), &[], Options::new().format("(["))
            .unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_ATTRIBUTE_OPTION");

        let err = AttributeDef::declare(
            &registry(),
            "x",
            "string".into(),
            &[],
            Options::new().min_length(5).max_length(2),
        )
        .unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_ATTRIBUTE_OPTION");
    }

    #[test]
    fn test_non_coercible_keeps_raw_value() {
        let def = AttributeDef::declare(&registry(), "age", "integer".into(), &[], Options::new())
            .unwrap();
        assert_eq!(def.prepare(Value::from("12")), Value::from("12"));
    }

    #[test]
    fn test_producer_default_runs_each_time() {
        use std::sync::atomic::{AtomicI64, Ordering};
        let counter = Arc::new(AtomicI64::new(0));
        let seen = Arc::clone(&counter);
        let def = AttributeDef::declare(
            &registry(),
            "seq",
            "integer".into(),
            &[],
            Options::new().default_with(move || Value::Integer(seen.fetch_add(1, Ordering::SeqCst))),
        )
        .unwrap();
        assert_eq!(def.default_value(), Some(Value::Integer(0)));
        assert_eq!(def.default_value(), Some(Value::Integer(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_proc_marker_round_trip() {
        let detached = DefaultValue::from_json(&JsonValue::String(PROC_MARKER.into()));
        assert!(detached.produce().is_none());
        assert_eq!(detached.to_json(), JsonValue::String(PROC_MARKER.into()));
    }
}
