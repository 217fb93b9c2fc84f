//! Type protocol and registry
//!
//! Every attribute type implements [`FieldType`]. Built-in types are
//! registered in a [`TypeRegistry`] under their tag; a struct type can also
//! serve as an attribute type (nested structs).
//!
//! # Contract
//!
//! - `coerce` never fails: unconvertible input yields [`Value::Null`]
//! - `coerce` is idempotent: native values come back unchanged
//! - `is_native` decides the "is invalid" type check

mod array;
mod boolean;
mod float;
mod integer;
mod registry;
mod string;
mod string_hash;
mod temporal;

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

pub use array::ArrayType;
pub use boolean::BooleanType;
pub use float::{CurrencyType, FloatType};
pub use integer::IntegerType;
pub use registry::TypeRegistry;
pub use string::StringType;
pub use string_hash::StringHashType;
pub use temporal::{DateTimeType, DateType, TimeType};

/// Capability contract of an attribute type.
pub trait FieldType: fmt::Debug + Send + Sync {
    /// Registry tag, e.g. `"string"` or `"array"`.
    fn tag(&self) -> &str;

    /// Whether `value` is already in this type's native representation.
    fn is_native(&self, value: &Value) -> bool;

    /// Whether this type declares `value` convertible. Conversion may still
    /// produce null (e.g. an unparseable date string).
    fn can_coerce(&self, _value: &Value) -> bool {
        true
    }

    /// Converts a non-null, non-native value. Returns null on failure.
    fn coerce_value(&self, value: &Value) -> Value;

    /// True iff `value` is native or declared convertible.
    fn coercible(&self, value: &Value) -> bool {
        !value.is_null() && (self.is_native(value) || self.can_coerce(value))
    }

    /// Best-effort conversion into the native representation.
    fn coerce(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        if self.is_native(value) {
            return value.clone();
        }
        if !self.can_coerce(value) {
            return Value::Null;
        }
        self.coerce_value(value)
    }

    /// Whether declarations of this type must supply an `of` element type.
    fn requires_element(&self) -> bool {
        false
    }

    /// Specializes a container type for an element type. Types that take no
    /// element return `None`.
    fn with_element(&self, _element: Arc<dyn FieldType>) -> Option<Arc<dyn FieldType>> {
        None
    }
}
