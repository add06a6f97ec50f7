//! Configuration structures for the outbound-call gateway
//!
//! Durations are stored as plain millisecond integers so the same structs
//! deserialize from JSON, TOML and environment variables without custom
//! serde adapters. Use the accessor methods to obtain `Duration`s.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default base backoff delay in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 200;
/// Default number of consecutive failures that trip a breaker.
pub const DEFAULT_BREAKER_THRESHOLD: u32 = 3;
/// Default breaker cooldown in milliseconds.
pub const DEFAULT_BREAKER_COOLDOWN_MS: u64 = 30_000;

/// Top-level gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub http: HttpCallConfig,
    pub alerts: AlertsConfig,
    pub logging: LoggingConfig,
}

/// Defaults applied to every outbound call unless overridden per call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpCallConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub breaker_threshold: u32,
    pub breaker_cooldown_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpCallConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_ms: DEFAULT_BACKOFF_MS,
            breaker_threshold: DEFAULT_BREAKER_THRESHOLD,
            breaker_cooldown_ms: DEFAULT_BREAKER_COOLDOWN_MS,
            user_agent: None,
        }
    }
}

impl HttpCallConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_millis(self.breaker_cooldown_ms)
    }
}

/// Alert webhook settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Slack-compatible incoming webhook URL; alerts are skipped when unset.
    pub slack_webhook: Option<String>,
    pub breaker_key: String,
    pub label: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            slack_webhook: None,
            breaker_key: "slack-webhook".to_string(),
            label: "slack-alerts".to_string(),
        }
    }
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_call_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.http.timeout(), Duration::from_millis(5_000));
        assert_eq!(config.http.max_retries, 2);
        assert_eq!(config.http.backoff(), Duration::from_millis(200));
        assert_eq!(config.http.breaker_threshold, 3);
        assert_eq!(config.http.breaker_cooldown(), Duration::from_secs(30));
        assert_eq!(config.alerts.breaker_key, "slack-webhook");
        assert!(config.alerts.slack_webhook.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_json_fills_remaining_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{ "http": { "max_retries": 5 } }"#).expect("parse");
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.alerts, AlertsConfig::default());
    }

    #[test]
    fn parses_toml_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [alerts]
            slack_webhook = "https://hooks.slack.test/T000/B000"

            [logging]
            json = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.alerts.slack_webhook.as_deref(), Some("https://hooks.slack.test/T000/B000"));
        assert!(config.logging.json);
        assert_eq!(config.http, HttpCallConfig::default());
    }
}
