//! Struct instances
//!
//! Construction runs one pipeline for every variant:
//!
//! 1. positional values, in declaration order
//! 2. named values (names or aliases); unknown names go through the extras
//!    policy
//! 3. defaults for attributes absent from the input
//! 4. the variant's validation policy
//!
//! Values are prepared (coerced where the attribute asks for it) as they
//! are assigned, so defaults and later writes go through the same path as
//! construction input.

use tracing::{debug, trace};

use super::args::Args;
use super::struct_type::StructType;
use super::variant::{ExtrasPolicy, Variant};
use crate::errors::{BuildError, FieldStructError, FieldStructResult};
use crate::validation::{CollectMode, Validator};
use crate::value::{Value, ValueMap};

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Assembling,
    Validating,
    Valid,
    Invalid,
    /// Mutable instance written since its last validation.
    Stale,
    /// Basic instances are never validated.
    Unchecked,
}

/// One instance of a [`StructType`].
#[derive(Debug, Clone)]
pub struct StructInstance {
    struct_type: StructType,
    values: Vec<Value>,
    extras: ValueMap,
    errors: Vec<String>,
    state: State,
    stale: bool,
}

impl StructInstance {
    pub(crate) fn build(struct_type: StructType, args: Args) -> FieldStructResult<Self> {
        let mut instance = Self::assemble(struct_type, args)?;
        instance.apply_variant()?;
        Ok(instance)
    }

    /// Builds a value for a nested attribute. A strict type that does not
    /// validate is kept with its failures recorded, so the enclosing
    /// instance reports them under the attribute name.
    pub(crate) fn build_nested(struct_type: StructType, args: Args) -> FieldStructResult<Self> {
        let mut instance = Self::assemble(struct_type, args)?;
        if !instance.struct_type.variant().validates() {
            instance.state = State::Unchecked;
        } else if !instance.validate() {
            debug!(
                struct_type = %instance.struct_type.name(),
                errors = instance.errors.len(),
                "nested instance does not validate"
            );
        }
        Ok(instance)
    }

    /// Steps 1-3 of construction: positional values, named values, defaults.
    fn assemble(struct_type: StructType, args: Args) -> FieldStructResult<Self> {
        let count = struct_type.schema().len();
        let given = args.positional().len();
        if given > count {
            return Err(FieldStructError::TooManyArguments {
                struct_name: struct_type.name().to_string(),
                expected: count,
                given,
            });
        }

        let mut instance = Self {
            struct_type,
            values: vec![Value::Null; count],
            extras: ValueMap::new(),
            errors: Vec::new(),
            state: State::Assembling,
            stale: false,
        };
        let mut assigned = vec![false; count];

        for (i, value) in args.positional().iter().enumerate() {
            instance.assign(i, value.clone());
            assigned[i] = true;
        }

        for (name, value) in args.named() {
            match instance.struct_type.resolve(name) {
                Some(i) => {
                    instance.assign(i, value.clone());
                    assigned[i] = true;
                }
                None => instance.route_extra(name, value.clone())?,
            }
        }

        for (i, done) in assigned.iter().enumerate() {
            if *done {
                continue;
            }
            let default = instance.struct_type.schema().attributes()[i].default_value();
            if let Some(default) = default {
                instance.values[i] = default;
            }
        }

        Ok(instance)
    }

    fn assign(&mut self, position: usize, raw: Value) {
        let def = &self.struct_type.schema().attributes()[position];
        self.values[position] = def.prepare(raw);
    }

    /// Sends an undeclared name through the extras policy.
    fn route_extra(&mut self, name: &str, value: Value) -> FieldStructResult<()> {
        match self.struct_type.extras_policy() {
            ExtrasPolicy::Ignore => {
                trace!(struct_type = %self.struct_type.name(), key = %name, "extra ignored");
                Ok(())
            }
            ExtrasPolicy::Raise => Err(FieldStructError::UnknownAttribute {
                struct_name: self.struct_type.name().to_string(),
                attribute: name.to_string(),
            }),
            ExtrasPolicy::Add => {
                if !self.is_valid_extra_key(name) {
                    return Err(FieldStructError::InvalidKey {
                        struct_name: self.struct_type.name().to_string(),
                        key: name.to_string(),
                    });
                }
                self.extras.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    /// Extras keys are stored as given. Surrounding whitespace is allowed,
    /// but the trimmed key must be a non-empty identifier-like name that
    /// does not name a declared attribute or alias.
    fn is_valid_extra_key(&self, name: &str) -> bool {
        let key = name.trim();
        !key.is_empty()
            && !name.chars().any(char::is_control)
            && !key.chars().any(char::is_whitespace)
            && self.struct_type.resolve(key).is_none()
    }

    fn apply_variant(&mut self) -> FieldStructResult<()> {
        let variant = self.struct_type.variant();
        if !variant.validates() {
            self.state = State::Unchecked;
            return Ok(());
        }

        self.validate();

        if variant == Variant::Strict && !self.errors.is_empty() {
            debug!(
                struct_type = %self.struct_type.name(),
                errors = self.errors.len(),
                "strict construction rejected"
            );
            return Err(BuildError::new(std::mem::take(&mut self.errors)).into());
        }
        if self.state == State::Invalid {
            debug!(
                struct_type = %self.struct_type.name(),
                errors = self.errors.len(),
                "instance constructed invalid"
            );
        }
        Ok(())
    }

    fn collect_mode(&self) -> CollectMode {
        match self.struct_type.variant() {
            Variant::Mutable => CollectMode::FirstPerAttribute,
            _ => CollectMode::All,
        }
    }

    /// Validates the current values without touching the stored state.
    /// Basic instances always yield an empty list.
    pub fn current_errors(&self) -> Vec<String> {
        if !self.struct_type.variant().validates() {
            return Vec::new();
        }
        Validator::new(self.struct_type.schema())
            .with_mode(self.collect_mode())
            .validate(&self.values)
    }

    pub fn struct_type(&self) -> &StructType {
        &self.struct_type
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Whether writes have happened since the last validation. Stale
    /// instances report [`State::Stale`] until [`StructInstance::validate`]
    /// settles them.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Strict and flexible instances reject every write after construction.
    pub fn is_frozen(&self) -> bool {
        !self.struct_type.variant().is_writable()
    }

    /// Ordered error entries (`":<attr> <message>"`), reflecting any writes
    /// made since the last validation.
    pub fn errors(&self) -> Vec<String> {
        if self.stale {
            self.current_errors()
        } else {
            self.errors.clone()
        }
    }

    /// Basic instances are always valid.
    pub fn is_valid(&self) -> bool {
        match self.struct_type.variant() {
            Variant::Basic => true,
            _ if self.stale => self.current_errors().is_empty(),
            _ => self.errors.is_empty(),
        }
    }

    /// Re-runs validation, stores the result and clears the stale flag.
    pub fn validate(&mut self) -> bool {
        if !self.struct_type.variant().validates() {
            return true;
        }
        self.state = State::Validating;
        self.errors = self.current_errors();
        self.stale = false;
        self.state = if self.errors.is_empty() {
            State::Valid
        } else {
            State::Invalid
        };
        self.errors.is_empty()
    }

    /// Value of an attribute by name or alias.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.struct_type.resolve(name).map(|i| &self.values[i])
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(attribute name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.struct_type
            .schema()
            .attributes()
            .iter()
            .map(|def| def.name())
            .zip(self.values.iter())
    }

    /// Undeclared input captured under the `add` policy.
    pub fn extras(&self) -> &ValueMap {
        &self.extras
    }

    /// Writes an attribute by name or alias.
    ///
    /// Available on basic and mutable instances. An undeclared name goes
    /// through the extras policy as it does during construction.
    ///
    /// # Errors
    ///
    /// - `ImmutableInstance` on strict and flexible instances
    /// - `UnknownAttribute` / `InvalidKey` from the extras policy
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> FieldStructResult<()> {
        if self.is_frozen() {
            return Err(FieldStructError::ImmutableInstance {
                struct_name: self.struct_type.name().to_string(),
                attribute: name.to_string(),
            });
        }

        match self.struct_type.resolve(name) {
            Some(i) => self.assign(i, value.into()),
            None => self.route_extra(name, value.into())?,
        }

        if self.struct_type.variant() == Variant::Mutable {
            self.stale = true;
            self.state = State::Stale;
        }
        Ok(())
    }
}

impl PartialEq for StructInstance {
    fn eq(&self, other: &Self) -> bool {
        self.struct_type.same_type(&other.struct_type)
            && self.values == other.values
            && self.extras == other.extras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Options;
    use crate::types::TypeRegistry;

    fn user(registry: &TypeRegistry, variant: Variant, extras: ExtrasPolicy) -> StructType {
        StructType::builder_in("Examples::User", registry)
            .variant(variant)
            .extras(extras)
            .attribute("username", "string", &["required"], Options::new().format("^[a-z]+$"))
            .unwrap()
            .attribute("age", "integer", &["coercible"], Options::new())
            .unwrap()
            .attribute("role", "string", &[], Options::new().default_value("member"))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_positional_then_named() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Basic, ExtrasPolicy::Raise);
        let instance = st
            .instantiate(Args::new().arg("alice").arg("30").set("username", "bob"))
            .unwrap();
        assert_eq!(instance.get("username"), Some(&Value::from("bob")));
        assert_eq!(instance.get("age"), Some(&Value::Integer(30)));
        assert_eq!(instance.get("role"), Some(&Value::from("member")));
        assert_eq!(instance.state(), State::Unchecked);
    }

    #[test]
    fn test_too_many_positional_values() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Basic, ExtrasPolicy::Raise);
        let err = st
            .instantiate(Args::new().arg("a").arg(1).arg("r").arg("extra"))
            .unwrap_err();
        assert_eq!(err.code(), "FS_TOO_MANY_ARGUMENTS");
    }

    #[test]
    fn test_defaults_only_fill_absent_attributes() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Basic, ExtrasPolicy::Raise);
        let instance = st.instantiate(Args::new().set("role", Value::Null)).unwrap();
        assert_eq!(instance.get("role"), Some(&Value::Null));
    }

    #[test]
    fn test_extras_keys_kept_verbatim() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Flexible, ExtrasPolicy::Add);
        let instance = st
            .instantiate(Args::new().set("username", "a").set("  note ", "x"))
            .unwrap();
        assert_eq!(instance.extras().get("  note "), Some(&Value::from("x")));
        assert!(instance.extras().get("note").is_none());

        let err = st
            .instantiate(Args::new().set("username", "a").set("bad key", 1))
            .unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_KEY");
    }

    #[test]
    fn test_extras_cannot_shadow_attributes() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Flexible, ExtrasPolicy::Add);
        let err = st
            .instantiate(Args::new().set("username", "a").set(" username ", "b"))
            .unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_KEY");

        let basic = user(&registry, Variant::Basic, ExtrasPolicy::Add);
        let mut instance = basic.instantiate(Args::new().set("username", "a")).unwrap();
        let err = instance.set("role ", "x").unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_KEY");
        assert!(instance.extras().is_empty());
        assert_eq!(instance.get("role"), Some(&Value::from("member")));
    }

    #[test]
    fn test_flexible_constructs_invalid_instances() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Flexible, ExtrasPolicy::Raise);
        let instance = st
            .instantiate(Args::new().set("username", "Bad Name").set("age", "old"))
            .unwrap();
        assert_eq!(instance.state(), State::Invalid);
        // "old" coerces to null and age is optional
        assert_eq!(instance.get("age"), Some(&Value::Null));
        assert_eq!(instance.errors(), vec![":username is not in a valid format".to_string()]);
        assert!(!instance.is_valid());
        assert!(instance.is_frozen());
    }

    #[test]
    fn test_frozen_instances_reject_writes() {
        let registry = TypeRegistry::with_builtins();
        for variant in [Variant::Flexible, Variant::Strict] {
            let st = user(&registry, variant, ExtrasPolicy::Raise);
            let mut instance = st.instantiate(Args::new().set("username", "alice")).unwrap();
            let err = instance.set("username", "bob").unwrap_err();
            assert_eq!(err.code(), "FS_IMMUTABLE_INSTANCE");
            assert_eq!(instance.get("username"), Some(&Value::from("alice")));
        }
    }

    #[test]
    fn test_mutable_tracks_staleness() {
        let registry = TypeRegistry::with_builtins();
        let st = user(&registry, Variant::Mutable, ExtrasPolicy::Raise);
        let mut instance = st.instantiate(Args::new().set("username", "alice")).unwrap();
        assert!(instance.is_valid());
        assert!(!instance.is_stale());

        instance.set("username", "").unwrap();
        assert!(instance.is_stale());
        assert_eq!(instance.state(), State::Stale);
        assert!(!instance.is_valid());
        assert_eq!(instance.errors(), vec![":username is required".to_string()]);

        assert!(!instance.validate());
        assert!(!instance.is_stale());
        assert_eq!(instance.state(), State::Invalid);
    }
}
