//! CLI module for fieldstruct
//!
//! Provides command-line interface for:
//! - version: Derive the version of a serialized schema
//! - check: Validate a JSON document against a serialized schema
//! - store: Save a serialized schema into the schema directory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check, check_document, describe_version, run, run_command, store, store_schema, version,
    Session,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_response};
