//! Error taxonomy for fieldstruct
//!
//! Error codes:
//! - FS_UNKNOWN_TYPE (declaration)
//! - FS_UNKNOWN_ATTRIBUTE_OPTION (declaration)
//! - FS_INVALID_ATTRIBUTE_OPTION (declaration)
//! - FS_UNKNOWN_ATTRIBUTE (construction / assignment)
//! - FS_INVALID_KEY (construction / assignment)
//! - FS_TOO_MANY_ARGUMENTS (construction)
//! - FS_IMMUTABLE_INSTANCE (assignment)
//! - FS_BUILD_FAILED (strict construction)
//! - FS_MALFORMED_SCHEMA (dynamic build / store)
//! - FS_INVALID_CONFIG, FS_IO_ERROR, FS_JSON_ERROR
//!
//! Per-field validation failures are never errors. They live in a
//! [`Check`](crate::validation::Check) or an instance error list; only the
//! strict variant promotes them into a [`BuildError`].

use thiserror::Error;

/// Aggregate failure raised when a strict instance does not validate.
///
/// `Display` is the first failure; the full ordered list stays available
/// through [`BuildError::messages`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct BuildError {
    messages: Vec<String>,
}

impl BuildError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// First failure message, or an empty string for an empty list.
    pub fn summary(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or("")
    }

    /// Every failure message, in attribute declaration order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Fatal errors raised while declaring schemas, building instances or
/// loading serialized schemas.
#[derive(Debug, Error)]
pub enum FieldStructError {
    #[error("Unknown type [{0}]")]
    UnknownType(String),

    #[error("Unknown option for attribute [{0}]")]
    UnknownAttributeOption(String),

    #[error("Invalid option '{option}' for attribute '{attribute}': {reason}")]
    InvalidAttributeOption {
        attribute: String,
        option: String,
        reason: String,
    },

    #[error("unknown attribute '{attribute}' for {struct_name}.")]
    UnknownAttribute {
        struct_name: String,
        attribute: String,
    },

    #[error("invalid extras key '{key}' for {struct_name}")]
    InvalidKey { struct_name: String, key: String },

    #[error("{struct_name} declares {expected} attributes but {given} positional values were given")]
    TooManyArguments {
        struct_name: String,
        expected: usize,
        given: usize,
    },

    #[error("cannot assign '{attribute}': {struct_name} instances are immutable after construction")]
    ImmutableInstance {
        struct_name: String,
        attribute: String,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Malformed schema '{origin}': {reason}")]
    MalformedSchema { origin: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldStructError {
    /// Returns the stable string code of this error.
    pub fn code(&self) -> &'static str {
        match self {
            FieldStructError::UnknownType(_) => "FS_UNKNOWN_TYPE",
            FieldStructError::UnknownAttributeOption(_) => "FS_UNKNOWN_ATTRIBUTE_OPTION",
            FieldStructError::InvalidAttributeOption { .. } => "FS_INVALID_ATTRIBUTE_OPTION",
            FieldStructError::UnknownAttribute { .. } => "FS_UNKNOWN_ATTRIBUTE",
            FieldStructError::InvalidKey { .. } => "FS_INVALID_KEY",
            FieldStructError::TooManyArguments { .. } => "FS_TOO_MANY_ARGUMENTS",
            FieldStructError::ImmutableInstance { .. } => "FS_IMMUTABLE_INSTANCE",
            FieldStructError::Build(_) => "FS_BUILD_FAILED",
            FieldStructError::MalformedSchema { .. } => "FS_MALFORMED_SCHEMA",
            FieldStructError::InvalidConfig(_) => "FS_INVALID_CONFIG",
            FieldStructError::Io(_) => "FS_IO_ERROR",
            FieldStructError::Json(_) => "FS_JSON_ERROR",
        }
    }

    /// Returns the aggregate build error, if this is one.
    pub fn as_build_error(&self) -> Option<&BuildError> {
        match self {
            FieldStructError::Build(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn invalid_option(
        attribute: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FieldStructError::InvalidAttributeOption {
            attribute: attribute.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldStructError::MalformedSchema {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for fieldstruct operations
pub type FieldStructResult<T> = Result<T, FieldStructError>;
