//! Resilient outbound HTTP calls
//!
//! [`ResilientClient`] wraps a reqwest client with per-attempt timeouts,
//! exponential retry backoff and a per-destination circuit breaker. Callers
//! describe the policy per call with [`CallOptions`] and match on
//! [`CallError`] to tell "destination unhealthy" apart from "caller gave up"
//! and "circuit open, skip".

pub mod classifier;
pub mod client;
pub mod error;
pub mod options;

pub use classifier::{is_retryable_status, DefaultClassifier, Outcome, RetryClassifier};
pub use client::{ResilientClient, ResilientClientBuilder};
pub use error::{AttemptFailure, CallError};
pub use options::CallOptions;
