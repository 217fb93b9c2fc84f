//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::errors::FieldStructError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Schema could not be read or built
    SchemaError,
    /// Checked document does not validate
    InvalidInstance,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FS_CLI_CONFIG_ERROR",
            Self::IoError => "FS_CLI_IO_ERROR",
            Self::SchemaError => "FS_CLI_SCHEMA_ERROR",
            Self::InvalidInstance => "FS_CLI_INVALID_INSTANCE",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn schema_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SchemaError, msg)
    }

    /// Document failed validation with `count` error entries
    pub fn invalid_instance(count: usize) -> Self {
        Self::new(
            CliErrorCode::InvalidInstance,
            format!("instance has {} error(s)", count),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<FieldStructError> for CliError {
    fn from(e: FieldStructError) -> Self {
        let message = format!("{}: {}", e.code(), e);
        match e {
            FieldStructError::InvalidConfig(_) => Self::config_error(message),
            FieldStructError::Io(_) | FieldStructError::Json(_) => Self::io_error(message),
            _ => Self::schema_error(message),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::invalid_instance(2);
        assert_eq!(err.to_string(), "FS_CLI_INVALID_INSTANCE: instance has 2 error(s)");
    }

    #[test]
    fn test_library_errors_map_to_cli_codes() {
        let config: CliError = FieldStructError::InvalidConfig("bad".into()).into();
        assert_eq!(config.code_str(), "FS_CLI_CONFIG_ERROR");

        let schema: CliError = FieldStructError::UnknownType("money".into()).into();
        assert_eq!(schema.code_str(), "FS_CLI_SCHEMA_ERROR");
        assert!(schema.message().starts_with("FS_UNKNOWN_TYPE"));
    }
}
