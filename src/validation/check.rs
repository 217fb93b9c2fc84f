use crate::value::Value;

pub const REQUIRED: &str = "is required";
pub const INVALID: &str = "is invalid";
pub const NOT_INCLUDED: &str = "is not included in list";
pub const INVALID_FORMAT: &str = "is not in a valid format";

pub fn too_short(min: usize) -> String {
    format!("is too short (minimum is {} characters)", min)
}

pub fn too_long(max: usize) -> String {
    format!("is too long (maximum is {} characters)", max)
}

/// Outcome of validating one attribute value: the (possibly coerced) value
/// and its failure messages in check order.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    value: Value,
    messages: Vec<String>,
}

impl Check {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            messages: Vec::new(),
        }
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_parts(self) -> (Value, Vec<String>) {
        (self.value, self.messages)
    }
}
