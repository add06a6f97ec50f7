//! Failure classification for outbound calls.
//!
//! A classifier looks at one attempt's [`Outcome`] and decides whether another
//! attempt is worthwhile. Closures work as classifiers too:
//!
//! ```rust
//! use cleanops_infra::http::{CallOptions, Outcome};
//!
//! // Only retry failed attempts, never a response.
//! let options = CallOptions::default().retry_if(|outcome| matches!(outcome, Outcome::Failure(_)));
//! # let _ = options;
//! ```

use reqwest::{Response, StatusCode};

use super::error::AttemptFailure;

/// Result of one attempt as seen by a classifier
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// The destination answered
    Response(&'a Response),
    /// The attempt failed before producing a response
    Failure(&'a AttemptFailure),
}

impl Outcome<'_> {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response(response) => Some(response.status()),
            Self::Failure(failure) => failure.status(),
        }
    }
}

/// Decides whether an attempt outcome warrants another attempt
pub trait RetryClassifier: Send + Sync {
    fn is_retryable(&self, outcome: &Outcome<'_>) -> bool;
}

impl<F> RetryClassifier for F
where
    F: Fn(&Outcome<'_>) -> bool + Send + Sync,
{
    fn is_retryable(&self, outcome: &Outcome<'_>) -> bool {
        self(outcome)
    }
}

/// Default policy: server errors, 429 and 408 responses, and every attempt
/// failure are retried. Any other response is terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl RetryClassifier for DefaultClassifier {
    fn is_retryable(&self, outcome: &Outcome<'_>) -> bool {
        match outcome {
            Outcome::Response(response) => is_retryable_status(response.status()),
            Outcome::Failure(_) => true,
        }
    }
}

/// Statuses the default policy retries
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}
