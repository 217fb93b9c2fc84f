//! Schema metadata subsystem
//!
//! A schema is the ordered, versioned set of attribute definitions of one
//! struct type.
//!
//! # Design Principles
//!
//! - Declaration order is significant (positional input, output order)
//! - Re-declaring a name replaces the definition, never appends
//! - The version is a pure function of the hashed option keys
//! - Derived schemas fold ancestor declarations root-first

mod attribute;
mod metadata;
mod serialized;
mod version;

pub use attribute::{
    AttributeDef, AttributeOptions, DefaultValue, Flag, FormatPattern, Options, TypeSpec,
    PROC_MARKER,
};
pub use metadata::{derive_schema_name, Schema};
pub use serialized::{SerializedAttribute, SerializedSchema, SerializedType};
pub use version::{canonical_json, compute_version};
