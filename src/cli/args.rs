//! CLI argument definitions using clap
//!
//! Commands:
//! - fieldstruct version <schema>
//! - fieldstruct check <schema> [--input <document>]
//! - fieldstruct store <schema>
//!
//! Every command accepts `--config <path>`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fieldstruct - declarative struct types with coercion and validation
#[derive(Parser, Debug)]
#[command(name = "fieldstruct")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the version derived from a serialized schema
    Version {
        /// Serialized schema file
        schema: PathBuf,
    },

    /// Build an instance from a JSON document and report its errors
    Check {
        /// Serialized schema file
        schema: PathBuf,

        /// JSON document to check (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Save a serialized schema into the schema directory
    Store {
        /// Serialized schema file
        schema: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "fieldstruct",
            "check",
            "user.json",
            "--input",
            "doc.json",
            "--config",
            "fs.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("fs.json")));
        match cli.command {
            Command::Check { schema, input } => {
                assert_eq!(schema, PathBuf::from("user.json"));
                assert_eq!(input, Some(PathBuf::from("doc.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_schema_argument_required() {
        assert!(Cli::try_parse_from(["fieldstruct", "store"]).is_err());
    }
}
