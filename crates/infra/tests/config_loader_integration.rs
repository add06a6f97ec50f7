//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! environment variables.

use std::io::Write;
use std::sync::Mutex;

use cleanops_domain::CleanOpsError;
use cleanops_infra::config::{self, loader};
use cleanops_infra::http::CallOptions;
use once_cell::sync::Lazy;
use tempfile::NamedTempFile;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const ALL_VARS: [&str; 8] = [
    loader::ENV_HTTP_TIMEOUT_MS,
    loader::ENV_HTTP_MAX_RETRIES,
    loader::ENV_HTTP_BACKOFF_MS,
    loader::ENV_BREAKER_THRESHOLD,
    loader::ENV_BREAKER_COOLDOWN_MS,
    loader::ENV_SLACK_WEBHOOK,
    loader::ENV_LOG_LEVEL,
    loader::ENV_LOG_JSON,
];

fn clear_env() {
    for key in ALL_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "http": {
            "timeout_ms": 1200,
            "max_retries": 4,
            "backoff_ms": 50,
            "breaker_threshold": 5,
            "breaker_cooldown_ms": 10000,
            "user_agent": "cleanops-api/1.0"
        },
        "alerts": {
            "slack_webhook": "https://hooks.slack.test/services/T0/B0/json",
            "label": "ops-alerts"
        },
        "logging": {
            "level": "debug",
            "json": true
        }
    }"#;

    let mut temp_file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.http.timeout_ms, 1_200);
    assert_eq!(config.http.max_retries, 4);
    assert_eq!(config.http.backoff_ms, 50);
    assert_eq!(config.http.breaker_threshold, 5);
    assert_eq!(config.http.breaker_cooldown_ms, 10_000);
    assert_eq!(config.http.user_agent.as_deref(), Some("cleanops-api/1.0"));

    assert_eq!(
        config.alerts.slack_webhook.as_deref(),
        Some("https://hooks.slack.test/services/T0/B0/json")
    );
    assert_eq!(config.alerts.label, "ops-alerts");
    assert_eq!(config.alerts.breaker_key, "slack-webhook");

    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);

    let options = CallOptions::from_config(&config.http);
    assert_eq!(options.max_retries, 4);
    assert_eq!(options.breaker_threshold, 5);
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[http]
max_retries = 0
breaker_threshold = 1

[logging]
level = "warn"
"#;

    let mut temp_file = NamedTempFile::with_suffix(".toml").expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.http.max_retries, 0);
    assert_eq!(config.http.breaker_threshold, 1);
    assert_eq!(config.http.timeout_ms, 5_000);
    assert_eq!(config.logging.level, "warn");
    assert!(config.alerts.slack_webhook.is_none());
}

#[test]
fn test_invalid_file_content_is_config_error() {
    let mut temp_file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    temp_file.write_all(b"{ not json").expect("Failed to write to temp file");

    let err = config::load_from_file(Some(temp_file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, CleanOpsError::Config(msg) if msg.contains("JSON")));
}

#[test]
fn test_file_failing_validation_is_rejected() {
    let mut temp_file = NamedTempFile::with_suffix(".toml").expect("Failed to create temp file");
    temp_file.write_all(b"[http]\nbreaker_threshold = 0\n").expect("Failed to write to temp file");

    let err = config::load_from_file(Some(temp_file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, CleanOpsError::Config(msg) if msg.contains("breaker_threshold")));
}

#[test]
fn test_load_from_env_overrides_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    clear_env();

    std::env::set_var(loader::ENV_HTTP_TIMEOUT_MS, "800");
    std::env::set_var(loader::ENV_BREAKER_COOLDOWN_MS, "5000");
    std::env::set_var(loader::ENV_SLACK_WEBHOOK, "https://hooks.slack.test/services/T0/B0/env");
    std::env::set_var(loader::ENV_LOG_JSON, "yes");

    let result = config::load_from_env();
    clear_env();

    let config = result.expect("env config");
    assert_eq!(config.http.timeout_ms, 800);
    assert_eq!(config.http.breaker_cooldown_ms, 5_000);
    assert_eq!(config.http.max_retries, 2);
    assert_eq!(
        config.alerts.slack_webhook.as_deref(),
        Some("https://hooks.slack.test/services/T0/B0/env")
    );
    assert!(config.logging.json);
}

#[test]
fn test_load_from_env_rejects_invalid_webhook() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    clear_env();

    std::env::set_var(loader::ENV_SLACK_WEBHOOK, "hooks.slack.test/no-scheme");
    let result = config::load_from_env();
    clear_env();

    assert!(matches!(result, Err(CleanOpsError::Config(msg)) if msg.contains("slack_webhook")));
}

#[test]
fn test_env_overrides_apply_over_file_values() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    clear_env();

    let mut temp_file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    temp_file
        .write_all(br#"{ "http": { "max_retries": 6, "backoff_ms": 10 } }"#)
        .expect("Failed to write to temp file");
    let from_file =
        config::load_from_file(Some(temp_file.path().to_path_buf())).expect("file config");

    std::env::set_var(loader::ENV_HTTP_MAX_RETRIES, "1");
    let result = config::apply_env_overrides(from_file);
    clear_env();

    let config = result.expect("overrides");
    assert_eq!(config.http.max_retries, 1);
    assert_eq!(config.http.backoff_ms, 10);
}
