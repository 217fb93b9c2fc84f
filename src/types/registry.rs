//! Process-wide lookup from type tag to implementation.
//!
//! One mutex guards the map; it is held for a single map access and never
//! across a coercion or validation call. Registering a tag twice replaces
//! the earlier entry, which is how built-ins are overridden.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use super::{
    ArrayType, BooleanType, CurrencyType, DateTimeType, DateType, FieldType, FloatType,
    IntegerType, StringHashType, StringType, TimeType,
};
use crate::config::Config;
use crate::errors::{FieldStructError, FieldStructResult};

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Registry of attribute types indexed by tag.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Mutex<HashMap<String, Arc<dyn FieldType>>>,
}

impl TypeRegistry {
    /// Creates a registry with no types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in types with default formats.
    pub fn with_builtins() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates a registry holding the built-in types, with temporal
    /// fallback formats taken from `config`.
    pub fn with_config(config: &Config) -> Self {
        let registry = Self::empty();
        registry.register(Arc::new(StringType));
        registry.register(Arc::new(IntegerType));
        registry.register(Arc::new(FloatType));
        registry.register(Arc::new(CurrencyType));
        registry.register(Arc::new(BooleanType));
        registry.register(Arc::new(DateType::new(config.date_formats.clone())));
        registry.register(Arc::new(DateTimeType::new(config.datetime_formats.clone())));
        registry.register(Arc::new(TimeType::new(config.time_formats.clone())));
        registry.register(Arc::new(ArrayType::generic()));
        registry.register(Arc::new(StringHashType));
        registry
    }

    /// The process-wide registry, built from the default configuration on
    /// first use.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(TypeRegistry::with_builtins)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn FieldType>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.types.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `field_type` under its tag, returning the type it replaced.
    pub fn register(&self, field_type: Arc<dyn FieldType>) -> Option<Arc<dyn FieldType>> {
        let tag = field_type.tag().to_string();
        let previous = self.lock().insert(tag.clone(), field_type);
        if previous.is_some() {
            debug!(tag = %tag, "type registration replaced an existing entry");
        } else {
            debug!(tag = %tag, "type registered");
        }
        previous
    }

    /// Looks up a type by tag.
    pub fn get(&self, tag: &str) -> Option<Arc<dyn FieldType>> {
        self.lock().get(tag).cloned()
    }

    /// Looks up a type by tag, failing with `UnknownType`.
    pub fn lookup(&self, tag: &str) -> FieldStructResult<Arc<dyn FieldType>> {
        self.get(tag)
            .ok_or_else(|| FieldStructError::UnknownType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.lock().contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.lock().keys().cloned().collect();
        tags.sort();
        tags
    }
}
