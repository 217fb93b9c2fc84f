//! fieldstruct - declarative struct types with coercion and validation
//!
//! A struct type is declared once as an ordered list of typed attributes.
//! Instances are built from positional or named values, coerced to the
//! declared types and validated according to the type's variant:
//!
//! - `basic`: no validation
//! - `flexible`: validated, invalid instances are still built
//! - `mutable`: writable, validity follows the current values
//! - `strict`: invalid input is rejected with the full error list
//!
//! Schemas serialize to JSON together with a content version, and can be
//! rebuilt from that form at runtime.

pub mod cli;
pub mod config;
pub mod dynamic;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod structs;
pub mod types;
pub mod validation;
pub mod value;

pub use config::Config;
pub use dynamic::{SchemaBuilder, SchemaStore, TypeCatalog};
pub use errors::{BuildError, FieldStructError, FieldStructResult};
pub use schema::{Options, Schema, SerializedSchema};
pub use structs::{Args, ExtrasPolicy, MapOptions, StructInstance, StructType, Variant};
pub use types::{FieldType, TypeRegistry};
pub use validation::Check;
pub use value::Value;
