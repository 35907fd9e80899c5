//! Logging initialisation
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level; JSON output is opt-in for log shippers.

use agendum_domain::{LoggingConfig, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::InfraError;

/// Build the level filter for `config`.
///
/// An unparsable `RUST_LOG` or configured level falls back to `info`.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `AgendumError::Config` when a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config);
    let fmt_layer = fmt::layer().with_target(true).with_thread_ids(true);

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()
            .map_err(InfraError::from)?;
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).try_init().map_err(InfraError::from)?;
    }

    tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    Ok(())
}
