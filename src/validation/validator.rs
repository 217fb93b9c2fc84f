//! Attribute and schema validation
//!
//! Checks run in a fixed order and independently of each other:
//!
//! 1. required: value present when `required`
//! 2. type: value native to the declared type (nested instances also
//!    contribute their own failures)
//! 3. enum: value is one of `enum`
//! 4. format: string form matches `format`
//! 5. length: length within `min_length..=max_length`
//!
//! Checks 2-5 are skipped for blank values. Nothing here returns an error;
//! failures are messages.

use super::check::{self, Check};
use crate::schema::{AttributeDef, Schema};
use crate::value::Value;

/// Validates one raw value against an attribute definition.
pub fn validate_attribute(def: &AttributeDef, raw: &Value) -> Check {
    let mut result = Check::new(def.prepare(raw.clone()));
    let options = def.options();
    let value = result.value().clone();

    if value.is_blank() {
        if options.required {
            result.fail(check::REQUIRED);
        }
        return result;
    }

    if !def.field_type().is_native(&value) {
        result.fail(check::INVALID);
    }
    for message in nested_messages(&value) {
        result.fail(message);
    }

    if let Some(allowed) = &options.enum_values {
        if !allowed.contains(&value) {
            result.fail(check::NOT_INCLUDED);
        }
    }

    if let Some(format) = &options.format {
        if !format.is_match(&value.to_param_string()) {
            result.fail(check::INVALID_FORMAT);
        }
    }

    if let Some(len) = value.length() {
        if let Some(min) = options.min_length {
            if len < min {
                result.fail(check::too_short(min));
            }
        }
        if let Some(max) = options.max_length {
            if len > max {
                result.fail(check::too_long(max));
            }
        }
    }

    result
}

/// Failures of nested instances, re-prefixed with the child attribute name:
/// the child entry `":street is required"` becomes `"street is required"`.
fn nested_messages(value: &Value) -> Vec<String> {
    let strip = |entry: String| entry.trim_start_matches(':').to_string();
    match value {
        Value::Struct(instance) => instance.current_errors().into_iter().map(strip).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_struct)
            .flat_map(|instance| instance.current_errors())
            .map(strip)
            .collect(),
        _ => Vec::new(),
    }
}

/// Formats an instance error entry: `":<attr> <message>"`.
pub fn error_entry(attribute: &str, message: &str) -> String {
    format!(":{} {}", attribute, message)
}

/// How many messages per attribute a schema validation keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Every message of every attribute.
    All,
    /// The first message of each failing attribute.
    FirstPerAttribute,
}

/// Validates a positional value row against a schema.
///
/// Validator does not mutate values.
pub struct Validator<'a> {
    schema: &'a Schema,
    mode: CollectMode,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            mode: CollectMode::All,
        }
    }

    pub fn with_mode(mut self, mode: CollectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validates `values` (aligned with the schema's attributes; missing
    /// trailing values count as null) and returns formatted error entries
    /// in declaration order.
    pub fn validate(&self, values: &[Value]) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, def) in self.schema.attributes().iter().enumerate() {
            let value = values.get(i).unwrap_or(&Value::Null);
            let result = validate_attribute(def, value);
            let messages = result.messages();
            let kept = match self.mode {
                CollectMode::All => messages,
                CollectMode::FirstPerAttribute => &messages[..messages.len().min(1)],
            };
            errors.extend(kept.iter().map(|m| error_entry(def.name(), m)));
        }
        errors
    }
}
