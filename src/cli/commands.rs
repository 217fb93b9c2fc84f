//! CLI command implementations
//!
//! Each command loads one serialized schema, rebuilds it into a private
//! registry and catalog configured from the config file, and writes a
//! single JSON response.

use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::dynamic::{SchemaBuilder, SchemaStore, TypeCatalog};
use crate::errors::FieldStructError;
use crate::observability;
use crate::schema::SerializedSchema;
use crate::structs::{MapOptions, StructType};
use crate::types::TypeRegistry;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_response};

/// Main CLI entry point
///
/// Parses arguments, loads configuration, installs logging and dispatches
/// to the appropriate command. This is the only function that main.rs
/// should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let config = Config::load_or_default(cli.config.as_deref())?;
    observability::init_logging(&config.log_filter)?;
    run_command(config, cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(config: Config, cmd: Command) -> CliResult<()> {
    let session = Session::new(config);
    match cmd {
        Command::Version { schema } => version(&session, &schema),
        Command::Check { schema, input } => check(&session, &schema, input.as_deref()),
        Command::Store { schema } => store(&session, &schema),
    }
}

/// Registry and catalog shared by the schemas one command builds.
pub struct Session {
    config: Config,
    registry: TypeRegistry,
    catalog: TypeCatalog,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            registry: TypeRegistry::with_config(&config),
            catalog: TypeCatalog::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn builder(&self) -> SchemaBuilder<'_> {
        SchemaBuilder::new(&self.registry, &self.catalog).with_config(&self.config)
    }

    /// Reads and builds a serialized schema file.
    pub fn load(&self, path: &Path) -> CliResult<(SerializedSchema, StructType)> {
        let serialized = SchemaStore::read(path)?;
        let struct_type = self.builder().build(&serialized, None)?;
        Ok((serialized, struct_type))
    }
}

/// Print the version derived from a serialized schema
pub fn version(session: &Session, schema_path: &Path) -> CliResult<()> {
    write_response(describe_version(session, schema_path)?)
}

pub fn describe_version(session: &Session, schema_path: &Path) -> CliResult<Value> {
    let (serialized, struct_type) = session.load(schema_path)?;
    let stored = serialized.version.as_deref();
    Ok(json!({
        "name": struct_type.name(),
        "schema_name": struct_type.schema().schema_name(),
        "version": struct_type.version(),
        "stored_version": stored,
        "matches": stored.map_or(true, |v| v == struct_type.version()),
    }))
}

/// Check a JSON document against a serialized schema
///
/// The report is always written. An invalid document then fails the
/// command with `FS_CLI_INVALID_INSTANCE`.
pub fn check(session: &Session, schema_path: &Path, input: Option<&Path>) -> CliResult<()> {
    let document = read_document(input)?;
    let report = check_document(session, schema_path, document)?;
    let error_count = report["errors"].as_array().map_or(0, Vec::len);
    let valid = report["valid"].as_bool().unwrap_or(false);

    write_response(report)?;

    if !valid {
        return Err(CliError::invalid_instance(error_count));
    }
    Ok(())
}

pub fn check_document(session: &Session, schema_path: &Path, document: Value) -> CliResult<Value> {
    let (_, struct_type) = session.load(schema_path)?;

    let (errors, values) = match struct_type.instantiate(document) {
        Ok(instance) => {
            let values = instance.to_map_with(MapOptions {
                include_extras: true,
                compact: false,
            });
            (instance.errors(), Value::Object(values))
        }
        Err(FieldStructError::Build(rejected)) => (rejected.into_messages(), Value::Null),
        Err(e) => return Err(e.into()),
    };

    Ok(json!({
        "struct_type": struct_type.name(),
        "variant": struct_type.variant().as_str(),
        "valid": errors.is_empty(),
        "errors": errors,
        "values": values,
    }))
}

/// Save a serialized schema into the configured schema directory
pub fn store(session: &Session, schema_path: &Path) -> CliResult<()> {
    write_response(store_schema(session, schema_path)?)
}

pub fn store_schema(session: &Session, schema_path: &Path) -> CliResult<Value> {
    let (_, struct_type) = session.load(schema_path)?;
    let store = SchemaStore::new(&session.config().schema_dir);
    let path = store.save(&struct_type)?;
    info!(path = %path.display(), "schema saved");
    Ok(json!({
        "path": path.display().to_string(),
        "version": struct_type.version(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_schema(dir: &TempDir, variant: &str) -> PathBuf {
        let path = dir.path().join("user.json");
        let schema = json!({
            "name": "Examples::User",
            "type": variant,
            "extras": "add",
            "attributes": {
                "username": {"type": "string", "required": true},
                "age": {"type": "integer", "coercible": true}
            }
        });
        fs::write(&path, schema.to_string()).unwrap();
        path
    }

    #[test]
    fn test_describe_version_without_stored_version() {
        let dir = TempDir::new().unwrap();
        let path = write_schema(&dir, "flexible");
        let session = Session::new(Config::default());

        let report = describe_version(&session, &path).unwrap();
        assert_eq!(report["name"], "Examples::User");
        assert_eq!(report["schema_name"], "examples.user");
        assert_eq!(report["stored_version"], Value::Null);
        assert_eq!(report["matches"], true);
        assert!(!report["version"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_check_document_reports_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_schema(&dir, "flexible");
        let session = Session::new(Config::default());

        let report = check_document(&session, &path, json!({"age": "42", "note": "hi"})).unwrap();
        assert_eq!(report["valid"], false);
        assert_eq!(report["errors"], json!([":username is required"]));
        assert_eq!(report["values"], json!({"username": null, "age": 42, "note": "hi"}));
    }

    #[test]
    fn test_check_document_strict_rejection() {
        let dir = TempDir::new().unwrap();
        let path = write_schema(&dir, "strict");
        let session = Session::new(Config::default());

        let report = check_document(&session, &path, json!({})).unwrap();
        assert_eq!(report["valid"], false);
        assert_eq!(report["values"], Value::Null);
        assert_eq!(report["errors"], json!([":username is required"]));
    }

    #[test]
    fn test_store_schema_into_configured_directory() {
        let dir = TempDir::new().unwrap();
        let path = write_schema(&dir, "flexible");
        let config = Config {
            schema_dir: dir.path().join("store"),
            ..Config::default()
        };
        let session = Session::new(config);

        let report = store_schema(&session, &path).unwrap();
        let stored = PathBuf::from(report["path"].as_str().unwrap());
        assert!(stored.starts_with(dir.path().join("store")));
        assert!(stored.exists());
    }

    #[test]
    fn test_missing_schema_file_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(Config::default());
        let err = describe_version(&session, &dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code_str(), "FS_CLI_SCHEMA_ERROR");
    }
}
