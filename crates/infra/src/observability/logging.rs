//! Tracing subscriber installation
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity for a single run without touching config files.

use cleanops_domain::{CleanOpsError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber
///
/// # Errors
/// Returns `CleanOpsError::Config` if the level is not a valid filter, or
/// `CleanOpsError::Internal` if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|e| {
        CleanOpsError::Internal(format!("Failed to install tracing subscriber: {}", e))
    })?;

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| {
        CleanOpsError::Config(format!("Invalid log level {:?}: {}", config.level, e))
    })
}
