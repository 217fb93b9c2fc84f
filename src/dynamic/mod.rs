//! Dynamic struct types
//!
//! Serialized schemas are turned back into live struct types, stored in a
//! namespace catalog and persisted in a schema directory.

mod builder;
mod namespace;
mod store;

pub use builder::SchemaBuilder;
pub use namespace::TypeCatalog;
pub use store::SchemaStore;
