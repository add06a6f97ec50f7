//! Per-call options for [`ResilientClient`](super::ResilientClient).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cleanops_common::resilience::{BreakerSettings, ConfigResult};
use cleanops_domain::config::{
    HttpCallConfig, DEFAULT_BACKOFF_MS, DEFAULT_BREAKER_COOLDOWN_MS, DEFAULT_BREAKER_THRESHOLD,
    DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS,
};
use tokio_util::sync::CancellationToken;

use super::classifier::{DefaultClassifier, Outcome, RetryClassifier};

/// Options for one outbound call
///
/// Every field has a default; the client never mutates the options it is
/// given, so one value can be reused across calls.
#[derive(Clone)]
pub struct CallOptions {
    pub timeout_per_attempt: Duration,
    /// Retries after the first attempt (`2` means up to three attempts)
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub classifier: Arc<dyn RetryClassifier>,
    /// Destination key for the circuit breaker; `None` disables the breaker
    pub breaker_key: Option<String>,
    pub breaker_threshold: u32,
    pub breaker_cooldown: Duration,
    /// Diagnostic name used in logs and error messages
    pub label: String,
    pub cancellation: Option<CancellationToken>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout_per_attempt: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            classifier: Arc::new(DefaultClassifier),
            breaker_key: None,
            breaker_threshold: DEFAULT_BREAKER_THRESHOLD,
            breaker_cooldown: Duration::from_millis(DEFAULT_BREAKER_COOLDOWN_MS),
            label: "http".to_string(),
            cancellation: None,
        }
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("timeout_per_attempt", &self.timeout_per_attempt)
            .field("max_retries", &self.max_retries)
            .field("base_backoff", &self.base_backoff)
            .field("breaker_key", &self.breaker_key)
            .field("breaker_threshold", &self.breaker_threshold)
            .field("breaker_cooldown", &self.breaker_cooldown)
            .field("label", &self.label)
            .field("cancellable", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

impl CallOptions {
    /// Options seeded from configured defaults
    pub fn from_config(config: &HttpCallConfig) -> Self {
        Self {
            timeout_per_attempt: config.timeout(),
            max_retries: config.max_retries,
            base_backoff: config.backoff(),
            breaker_threshold: config.breaker_threshold,
            breaker_cooldown: config.breaker_cooldown(),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_per_attempt = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn classifier(mut self, classifier: impl RetryClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Use a closure as the retry classifier
    pub fn retry_if<F>(self, predicate: F) -> Self
    where
        F: Fn(&Outcome<'_>) -> bool + Send + Sync + 'static,
    {
        self.classifier(predicate)
    }

    pub fn breaker(mut self, key: impl Into<String>) -> Self {
        self.breaker_key = Some(key.into());
        self
    }

    pub fn breaker_threshold(mut self, threshold: u32) -> Self {
        self.breaker_threshold = threshold;
        self
    }

    pub fn breaker_cooldown(mut self, cooldown: Duration) -> Self {
        self.breaker_cooldown = cooldown;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Validated breaker parameters, or `None` when no breaker key is set
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for a zero threshold.
    pub fn breaker_settings(&self) -> ConfigResult<Option<(&str, BreakerSettings)>> {
        let Some(key) = self.breaker_key.as_deref() else {
            return Ok(None);
        };
        let settings = BreakerSettings::new(self.breaker_threshold, self.breaker_cooldown)?;
        Ok(Some((key, settings)))
    }

    /// Whether the caller has already given up
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}
