//! Coercion Property Tests
//!
//! For every built-in type:
//! - coercion yields null or a native value
//! - coercing an already coerced value changes nothing

use std::sync::Arc;

use fieldstruct::types::{ArrayType, FieldType, IntegerType};
use fieldstruct::{StructType, TypeRegistry, Value};
use proptest::prelude::*;

const BUILTIN_TAGS: &[&str] = &[
    "string",
    "integer",
    "float",
    "currency",
    "boolean",
    "date",
    "datetime",
    "time",
    "array",
    "string_hash",
];

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1_000_000_000i64..1_000_000_000).prop_map(Value::Integer),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[0-9$.,:/ a-zA-Z-]{0,16}".prop_map(Value::from),
        prop_oneof![
            Just("2020-03-01"),
            Just("01/03/2020"),
            Just("2020-03-01T15:10:14+02:00"),
            Just("2020-03-01 15:10:14 -0600"),
            Just("15:10:14"),
            Just("3 pm"),
        ]
        .prop_map(Value::from),
    ]
}

fn all_types() -> Vec<Arc<dyn FieldType>> {
    let registry = TypeRegistry::with_builtins();
    let mut types: Vec<_> = BUILTIN_TAGS
        .iter()
        .map(|tag| registry.lookup(tag).unwrap())
        .collect();
    types.push(Arc::new(ArrayType::of(Arc::new(IntegerType))));
    types
}

proptest! {
    #[test]
    fn coercion_yields_null_or_native(value in scalar_value()) {
        for field_type in all_types() {
            let coerced = field_type.coerce(&value);
            prop_assert!(
                coerced.is_null() || field_type.is_native(&coerced),
                "{} coerced {:?} to {:?}", field_type.tag(), value, coerced
            );
        }
    }

    #[test]
    fn coercion_is_idempotent(value in scalar_value()) {
        for field_type in all_types() {
            let once = field_type.coerce(&value);
            let twice = field_type.coerce(&once);
            prop_assert_eq!(&once, &twice, "type {}", field_type.tag());
        }
    }

    #[test]
    fn coercible_agrees_with_null_input(value in scalar_value()) {
        for field_type in all_types() {
            if value.is_null() {
                prop_assert!(!field_type.coercible(&value));
            }
        }
    }

    #[test]
    fn version_depends_only_on_declarations(
        names in proptest::collection::btree_set("[a-z]{1,8}", 1..6),
        first in "[A-Z][a-z]{1,6}",
        second in "[A-Z][a-z]{1,6}",
    ) {
        let registry = TypeRegistry::with_builtins();
        let declare = |type_name: &str| {
            let mut builder = StructType::builder_in(type_name, &registry);
            for name in &names {
                builder = builder.optional(name, "string").unwrap();
            }
            builder.build().unwrap()
        };
        prop_assert_eq!(
            declare(&first).version().to_string(),
            declare(&second).version().to_string()
        );
    }
}
