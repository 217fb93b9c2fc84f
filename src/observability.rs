//! Logging setup
//!
//! Events are emitted through `tracing` across the crate:
//!
//! - `debug`: declarations, coercion fallbacks, rejected constructions
//! - `info`: dynamic builds, replacements and store writes
//! - `warn`: serialized versions that differ from the rebuilt schema
//!
//! The library never installs a subscriber on its own. Binaries call
//! [`init_logging`] once at startup; `RUST_LOG` overrides the configured
//! filter when set.

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::errors::{FieldStructError, FieldStructResult};

/// Installs a formatting subscriber writing to stderr.
///
/// Installing twice is harmless; the first subscriber stays in place.
///
/// # Errors
///
/// `InvalidConfig` when `filter` is not a valid filter directive and
/// `RUST_LOG` is unset.
pub fn init_logging(filter: &str) -> FieldStructResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter).map_err(|e| {
            FieldStructError::InvalidConfig(format!("invalid log filter '{}': {}", filter, e))
        })?,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
    Ok(())
}
