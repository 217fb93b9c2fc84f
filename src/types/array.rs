use std::sync::Arc;

use super::FieldType;
use crate::value::Value;

/// `array`, optionally specialized by an element type (`of`).
///
/// A non-array input is wrapped into a single-element array before element
/// coercion is applied.
#[derive(Debug, Clone, Default)]
pub struct ArrayType {
    element: Option<Arc<dyn FieldType>>,
}

impl ArrayType {
    /// Untyped array, as registered under the `array` tag.
    pub fn generic() -> Self {
        Self { element: None }
    }

    pub fn of(element: Arc<dyn FieldType>) -> Self {
        Self {
            element: Some(element),
        }
    }

    pub fn element(&self) -> Option<&Arc<dyn FieldType>> {
        self.element.as_ref()
    }

    fn coerce_item(&self, item: &Value) -> Value {
        match &self.element {
            Some(element) => element.coerce(item),
            None => item.clone(),
        }
    }
}

impl FieldType for ArrayType {
    fn tag(&self) -> &str {
        "array"
    }

    fn is_native(&self, value: &Value) -> bool {
        match (value, &self.element) {
            (Value::Array(_), None) => true,
            (Value::Array(items), Some(element)) => items.iter().all(|i| element.is_native(i)),
            _ => false,
        }
    }

    fn coerce_value(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|i| self.coerce_item(i)).collect()),
            other => Value::Array(vec![self.coerce_item(other)]),
        }
    }

    fn requires_element(&self) -> bool {
        true
    }

    fn with_element(&self, element: Arc<dyn FieldType>) -> Option<Arc<dyn FieldType>> {
        Some(Arc::new(ArrayType::of(element)))
    }
}
