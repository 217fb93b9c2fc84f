//! Coercion and validation engine
//!
//! Validation never fails with an error: every outcome is a [`Check`] or a
//! list of formatted entries. Whether failures abort construction is decided
//! by the struct variant, not here.

mod check;
mod validator;

pub use check::{
    too_long, too_short, Check, INVALID, INVALID_FORMAT, NOT_INCLUDED, REQUIRED,
};
pub use validator::{error_entry, validate_attribute, CollectMode, Validator};
