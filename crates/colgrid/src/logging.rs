//! Subscriber setup for hosts that do not bring their own.
//!
//! colgrid only emits `tracing` events. Hosts with an existing subscriber
//! need nothing from here; the others can call [`init`] once at startup.
//! The filter is read from `COLGRID_LOG` using `EnvFilter` syntax, for
//! example `COLGRID_LOG=colgrid.drag=trace,warn`.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "COLGRID_LOG";

/// Directive used when `COLGRID_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Build the filter from `COLGRID_LOG`, falling back to [`DEFAULT_DIRECTIVE`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a human-readable global subscriber.
///
/// Fails with [`Error::Logging`] if a global subscriber is already set.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}

/// Install a global subscriber that writes one JSON object per event.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
