use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation and mutability policy of a struct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// No validation; storage and defaults only.
    Basic,
    /// Validates once at construction, keeps every message, then frozen.
    Flexible,
    /// Validates at construction and after every write; stays writable.
    Mutable,
    /// Any failure aborts construction; frozen on success.
    Strict,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Flexible => "flexible",
            Variant::Mutable => "mutable",
            Variant::Strict => "strict",
        }
    }

    /// Whether `set` is available after construction.
    pub fn is_writable(&self) -> bool {
        matches!(self, Variant::Basic | Variant::Mutable)
    }

    pub fn validates(&self) -> bool {
        !matches!(self, Variant::Basic)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling of input names a schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrasPolicy {
    /// Captured in the instance's extras map.
    Add,
    /// Silently dropped.
    Ignore,
    /// Construction fails with `UnknownAttribute`.
    Raise,
}

impl ExtrasPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtrasPolicy::Add => "add",
            ExtrasPolicy::Ignore => "ignore",
            ExtrasPolicy::Raise => "raise",
        }
    }
}

impl fmt::Display for ExtrasPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Variant::Mutable).unwrap(), "\"mutable\"");
        let policy: ExtrasPolicy = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(policy, ExtrasPolicy::Ignore);
    }

    #[test]
    fn test_writability() {
        assert!(Variant::Basic.is_writable());
        assert!(Variant::Mutable.is_writable());
        assert!(!Variant::Strict.is_writable());
        assert!(!Variant::Flexible.is_writable());
    }
}
