//! Keyed circuit breaker registry
//!
//! One [`BreakerState`] per destination key (e.g. `"slack-webhook"`), counting
//! consecutive failures and tripping once a threshold is reached.
//!
//! # State Transitions
//! ```text
//! absent → counting:  first recorded failure (failure_count = 1)
//! counting → open:    recorded failure with failure_count >= threshold
//! open → absent:      lookup observes now >= open_until (purged)
//! any → absent:       reset (non-retryable outcome)
//! ```
//!
//! There is no tracked half-open state: once the cooldown has elapsed the
//! entry is forgotten and the next call is let through with a fresh count.
//! The registry is an explicit value shared through `Arc`, never a
//! process-wide singleton.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Simple configuration error for validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Trip parameters applied when recording a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Consecutive recorded failures that open the circuit
    pub threshold: u32,
    /// How long the circuit stays open once tripped
    pub cooldown: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self { threshold: 3, cooldown: Duration::from_secs(30) }
    }
}

impl BreakerSettings {
    /// Create validated settings
    pub fn new(threshold: u32, cooldown: Duration) -> ConfigResult<Self> {
        let settings = Self { threshold, cooldown };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "breaker threshold must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Failure history for one destination key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerState {
    /// Consecutive failures recorded since the breaker last closed
    pub failure_count: u32,
    /// Instant until which calls are blocked; `None` while still counting
    pub open_until: Option<Instant>,
}

impl BreakerState {
    fn first_failure() -> Self {
        Self { failure_count: 1, open_until: None }
    }

    /// Whether this state blocks calls at `now`
    pub fn is_blocking(&self, now: Instant) -> bool {
        self.open_until.is_some_and(|until| until > now)
    }

    /// Whether the circuit tripped and its cooldown has elapsed at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        self.open_until.is_some_and(|until| until <= now)
    }
}

/// In-process registry of breaker states keyed by destination
#[derive(Debug, Default)]
pub struct CircuitRegistry {
    states: DashMap<String, BreakerState>,
}

impl CircuitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `key` is currently blocking calls.
    ///
    /// Returns the blocking state while `open_until > now`. An entry whose
    /// cooldown has elapsed is deleted and `None` is returned, so the next
    /// failure starts counting from one again.
    ///
    /// Entries that are still counting (never tripped) are kept, unlike a
    /// literal "purge whenever not blocking" rule, so failures accumulate
    /// across calls until the threshold is reached.
    pub fn is_open(&self, key: &str, now: Instant) -> Option<BreakerState> {
        let state = *self.states.get(key)?;

        if state.is_blocking(now) {
            return Some(state);
        }

        if state.is_expired(now) {
            // Another caller may have re-tripped the key in between.
            if self.states.remove_if(key, |_, current| current.is_expired(now)).is_some() {
                debug!(breaker_key = key, "circuit cooldown elapsed; forgetting failure history");
            }
        }

        None
    }

    /// Record one failure for `key` and return the updated state.
    ///
    /// The first failure creates the entry with a count of one. Each later
    /// failure increments the count; reaching `settings.threshold` opens the
    /// circuit for `settings.cooldown` starting at `now`.
    pub fn record_failure(&self, key: &str, settings: &BreakerSettings, now: Instant) -> BreakerState {
        match self.states.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                let state = BreakerState::first_failure();
                vacant.insert(state);
                state
            }
            Entry::Occupied(mut occupied) => {
                let state = occupied.get_mut();
                state.failure_count = state.failure_count.saturating_add(1);

                if state.failure_count >= settings.threshold {
                    match now.checked_add(settings.cooldown) {
                        Some(until) => {
                            state.open_until = Some(until);
                            warn!(
                                breaker_key = key,
                                failure_count = state.failure_count,
                                cooldown_ms = settings.cooldown.as_millis() as u64,
                                "circuit breaker opened"
                            );
                        }
                        None => warn!(
                            breaker_key = key,
                            cooldown_ms = settings.cooldown.as_millis() as u64,
                            "breaker cooldown overflows the clock; leaving circuit state unchanged"
                        ),
                    }
                }

                *state
            }
        }
    }

    /// Forget all failure history for `key`
    pub fn reset(&self, key: &str) {
        self.states.remove(key);
    }

    /// Peek at the state for `key` without purging expired entries
    pub fn state(&self, key: &str) -> Option<BreakerState> {
        self.states.get(key).map(|state| *state)
    }

    /// Number of keys with recorded history
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
