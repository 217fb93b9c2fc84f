//! Struct types and instances
//!
//! # Variant policies
//!
//! | variant  | validation                        | writes after construction |
//! |----------|-----------------------------------|---------------------------|
//! | basic    | none                              | allowed                   |
//! | flexible | once, every message kept          | rejected                  |
//! | mutable  | at construction and after writes  | allowed                   |
//! | strict   | once, failure aborts construction | rejected                  |

mod args;
mod conversion;
mod instance;
mod struct_type;
mod variant;

pub use args::Args;
pub use conversion::MapOptions;
pub use instance::{State, StructInstance};
pub use struct_type::{StructBuilder, StructType};
pub use variant::{ExtrasPolicy, Variant};
