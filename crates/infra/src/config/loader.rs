//! Configuration loader
//!
//! Loads gateway configuration from files and environment variables.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file (JSON or TOML)
//! 2. If none is found, start from built-in defaults
//! 3. Apply environment variable overrides on top
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `CLEANOPS_HTTP_TIMEOUT_MS`: Per-attempt timeout in milliseconds
//! - `CLEANOPS_HTTP_MAX_RETRIES`: Retries after the first attempt
//! - `CLEANOPS_HTTP_BACKOFF_MS`: Base backoff delay in milliseconds
//! - `CLEANOPS_BREAKER_THRESHOLD`: Consecutive failures that trip a breaker
//! - `CLEANOPS_BREAKER_COOLDOWN_MS`: Breaker cooldown in milliseconds
//! - `ALERTS_SLACK_WEBHOOK`: Slack incoming webhook URL for alerts
//! - `CLEANOPS_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `CLEANOPS_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cleanops.json` or `./cleanops.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cleanops_domain::{CleanOpsError, GatewayConfig, Result};
use url::Url;

pub const ENV_HTTP_TIMEOUT_MS: &str = "CLEANOPS_HTTP_TIMEOUT_MS";
pub const ENV_HTTP_MAX_RETRIES: &str = "CLEANOPS_HTTP_MAX_RETRIES";
pub const ENV_HTTP_BACKOFF_MS: &str = "CLEANOPS_HTTP_BACKOFF_MS";
pub const ENV_BREAKER_THRESHOLD: &str = "CLEANOPS_BREAKER_THRESHOLD";
pub const ENV_BREAKER_COOLDOWN_MS: &str = "CLEANOPS_BREAKER_COOLDOWN_MS";
pub const ENV_SLACK_WEBHOOK: &str = "ALERTS_SLACK_WEBHOOK";
pub const ENV_LOG_LEVEL: &str = "CLEANOPS_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "CLEANOPS_LOG_JSON";

/// Load configuration with automatic fallback strategy
///
/// Uses the first config file found by [`probe_config_paths`], or defaults
/// when there is none, then applies environment overrides.
///
/// # Errors
/// Returns `CleanOpsError::Config` if a config file exists but cannot be
/// parsed, an environment variable has an invalid value, or validation fails.
pub fn load() -> Result<GatewayConfig> {
    let base = match probe_config_paths() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration from file");
            read_config(&path)?
        }
        None => {
            tracing::debug!("No config file found, starting from defaults");
            GatewayConfig::default()
        }
    };

    let config = apply_env_overrides(base)?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from defaults plus environment variables
///
/// # Errors
/// Returns `CleanOpsError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<GatewayConfig> {
    let config = apply_env_overrides(GatewayConfig::default())?;
    validate(&config)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and
/// TOML (detected by file extension). Environment variables are not applied.
///
/// # Errors
/// Returns `CleanOpsError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<GatewayConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CleanOpsError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CleanOpsError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let config = read_config(&config_path)?;
    validate(&config)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<GatewayConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CleanOpsError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<GatewayConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CleanOpsError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CleanOpsError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CleanOpsError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.push(cwd.join("../config.json"));
        candidates.push(cwd.join("../config.toml"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("cleanops.json"),
        dir.join("cleanops.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
    ]
}

/// Apply environment variable overrides to `config`
///
/// # Errors
/// Returns `CleanOpsError::Config` if a set variable cannot be parsed.
pub fn apply_env_overrides(config: GatewayConfig) -> Result<GatewayConfig> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides<L>(mut config: GatewayConfig, lookup: L) -> Result<GatewayConfig>
where
    L: Fn(&str) -> Option<String>,
{
    if let Some(value) = parse_var(&lookup, ENV_HTTP_TIMEOUT_MS)? {
        config.http.timeout_ms = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_HTTP_MAX_RETRIES)? {
        config.http.max_retries = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_HTTP_BACKOFF_MS)? {
        config.http.backoff_ms = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_BREAKER_THRESHOLD)? {
        config.http.breaker_threshold = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_BREAKER_COOLDOWN_MS)? {
        config.http.breaker_cooldown_ms = value;
    }
    if let Some(webhook) = lookup(ENV_SLACK_WEBHOOK).filter(|value| !value.trim().is_empty()) {
        config.alerts.slack_webhook = Some(webhook);
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.logging.json = env_bool(&lookup, ENV_LOG_JSON, config.logging.json);

    Ok(config)
}

/// Validate a loaded configuration
///
/// # Errors
/// Returns `CleanOpsError::Config` for a zero timeout, a zero breaker
/// threshold, or an alert webhook that is not an http(s) URL.
pub fn validate(config: &GatewayConfig) -> Result<()> {
    if config.http.timeout_ms == 0 {
        return Err(CleanOpsError::Config("http.timeout_ms must be greater than 0".to_string()));
    }

    if config.http.breaker_threshold == 0 {
        return Err(CleanOpsError::Config(
            "http.breaker_threshold must be greater than 0".to_string(),
        ));
    }

    if let Some(webhook) = &config.alerts.slack_webhook {
        let url = Url::parse(webhook)
            .map_err(|e| CleanOpsError::Config(format!("Invalid alerts.slack_webhook: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CleanOpsError::Config(format!(
                "alerts.slack_webhook must use http or https, got {}",
                url.scheme()
            )));
        }
    }

    Ok(())
}

fn parse_var<L, T>(lookup: &L, key: &str) -> Result<Option<T>>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CleanOpsError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from an environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Returns `default` if the variable is not set.
fn env_bool<L>(lookup: &L, key: &str, default: bool) -> bool
where
    L: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
