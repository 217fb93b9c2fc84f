//! On-disk schema store
//!
//! - One file per schema version: `<schema_dir>/<schema_name>-<version>.json`
//! - Saving an identical schema again is a no-op
//! - A different schema under an existing file name is rejected
//! - Loading rebuilds every stored schema through a [`SchemaBuilder`]

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::builder::SchemaBuilder;
use crate::errors::{FieldStructError, FieldStructResult};
use crate::schema::SerializedSchema;
use crate::structs::StructType;

/// Directory of serialized schemas.
pub struct SchemaStore {
    schema_dir: PathBuf,
}

impl SchemaStore {
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// File a struct type is stored under.
    pub fn path_for(&self, struct_type: &StructType) -> PathBuf {
        let schema = struct_type.schema();
        self.schema_dir
            .join(format!("{}-{}.json", schema.schema_name(), schema.version()))
    }

    /// Saves the serialized schema of `struct_type`.
    pub fn save(&self, struct_type: &StructType) -> FieldStructResult<PathBuf> {
        let path = self.path_for(struct_type);
        let serialized = struct_type.schema().to_serialized();

        if path.exists() {
            let stored = Self::read(&path)?;
            if stored == serialized {
                info!(path = %path.display(), "schema already stored");
                return Ok(path);
            }
            return Err(FieldStructError::malformed(
                path.display().to_string(),
                "a different schema is already stored under this name",
            ));
        }

        fs::create_dir_all(&self.schema_dir).map_err(|e| {
            FieldStructError::malformed(
                self.schema_dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serialized.to_json().map_err(|e| {
            FieldStructError::malformed(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            FieldStructError::malformed(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        info!(path = %path.display(), struct_type = %struct_type.name(), "schema stored");
        Ok(path)
    }

    /// Reads one serialized schema file.
    pub fn read(path: &Path) -> FieldStructResult<SerializedSchema> {
        let content = fs::read_to_string(path).map_err(|e| {
            FieldStructError::malformed(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        SerializedSchema::from_json(&content).map_err(|e| {
            FieldStructError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })
    }

    /// Reads and builds one stored schema.
    pub fn load(&self, path: &Path, builder: &SchemaBuilder<'_>) -> FieldStructResult<StructType> {
        let serialized = Self::read(path)?;
        builder.build(&serialized, None)
    }

    /// Builds every `.json` file in the schema directory, in file name
    /// order. A missing directory holds no schemas.
    pub fn load_all(&self, builder: &SchemaBuilder<'_>) -> FieldStructResult<Vec<StructType>> {
        if !self.schema_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            FieldStructError::malformed(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                FieldStructError::malformed(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let types = paths
            .iter()
            .map(|path| self.load(path, builder))
            .collect::<FieldStructResult<Vec<_>>>()?;

        info!(dir = %self.schema_dir.display(), count = types.len(), "schemas loaded");
        Ok(types)
    }
}
