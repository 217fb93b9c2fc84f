//! Configuration file structure
//!
//! Every field is optional; an empty JSON object yields [`Config::default`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{FieldStructError, FieldStructResult};
use crate::structs::{ExtrasPolicy, Variant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fallback chrono formats for `date`, tried after `YYYY-MM-DD`
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// Fallback chrono formats for `datetime`, tried after RFC 3339
    #[serde(default = "default_datetime_formats")]
    pub datetime_formats: Vec<String>,

    /// Fallback chrono formats for `time`, tried after `HH:MM:SS`
    #[serde(default = "default_time_formats")]
    pub time_formats: Vec<String>,

    /// Extras policy for serialized schemas that omit `extras`
    #[serde(default = "default_extras")]
    pub default_extras: ExtrasPolicy,

    /// Variant for serialized schemas that omit `type`
    #[serde(default = "default_variant")]
    pub default_variant: Variant,

    /// Default log filter directive; `RUST_LOG` overrides it
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Directory of the on-disk schema store
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,
}

fn default_date_formats() -> Vec<String> {
    vec!["%d/%m/%Y".to_string(), "%d %B %Y".to_string(), "%B %d, %Y".to_string()]
}
fn default_datetime_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d %H:%M:%S %z".to_string(),
        "%Y-%m-%d %H:%M:%S%.f %z".to_string(),
        "%a, %d %b %Y %H:%M:%S %z".to_string(),
    ]
}
fn default_time_formats() -> Vec<String> {
    vec!["%H:%M".to_string(), "%I:%M %p".to_string(), "%I:%M:%S %p".to_string()]
}
fn default_extras() -> ExtrasPolicy {
    ExtrasPolicy::Raise
}
fn default_variant() -> Variant {
    Variant::Flexible
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
            datetime_formats: default_datetime_formats(),
            time_formats: default_time_formats(),
            default_extras: default_extras(),
            default_variant: default_variant(),
            log_filter: default_log_filter(),
            schema_dir: default_schema_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> FieldStructResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FieldStructError::InvalidConfig(format!("Failed to read config: {}", e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| FieldStructError::InvalidConfig(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> FieldStructResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> FieldStructResult<()> {
        for (field, formats) in [
            ("date_formats", &self.date_formats),
            ("datetime_formats", &self.datetime_formats),
            ("time_formats", &self.time_formats),
        ] {
            if let Some(blank) = formats.iter().find(|f| f.trim().is_empty()) {
                return Err(FieldStructError::InvalidConfig(format!(
                    "{} contains a blank format: {:?}",
                    field, blank
                )));
            }
        }

        if self.log_filter.trim().is_empty() {
            return Err(FieldStructError::InvalidConfig(
                "log_filter must not be empty".to_string(),
            ));
        }

        if self.schema_dir.as_os_str().is_empty() {
            return Err(FieldStructError::InvalidConfig(
                "schema_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let file = write_config("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.default_extras, ExtrasPolicy::Raise);
        assert_eq!(config.default_variant, Variant::Flexible);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.schema_dir, PathBuf::from("schemas"));
    }

    #[test]
    fn test_overrides_are_read() {
        let file = write_config(
            r#"{"default_extras": "ignore", "default_variant": "strict", "date_formats": ["%d.%m.%Y"]}"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.default_extras, ExtrasPolicy::Ignore);
        assert_eq!(config.default_variant, Variant::Strict);
        assert_eq!(config.date_formats, vec!["%d.%m.%Y".to_string()]);
    }

    #[test]
    fn test_blank_format_rejected() {
        let file = write_config(r#"{"time_formats": ["  "]}"#);
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code(), "FS_INVALID_CONFIG");
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let file = write_config(r#"{"default_variant": "loose"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = Config::load(Path::new("/nonexistent/fieldstruct.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
