//! Error types for resilient outbound calls.
//!
//! [`CallError`] is the contract callers pattern-match on. Circuit-open,
//! cancellation and exhausted-retry failures are always distinct variants.

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Why a single attempt did not produce a usable response
#[derive(Debug, Error)]
pub enum AttemptFailure {
    /// The destination answered with a status the classifier retries
    #[error("retryable status {status}")]
    Status { status: StatusCode, response: Box<Response> },

    /// The per-attempt deadline elapsed before the call completed
    #[error("attempt timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Connection, TLS, protocol or body failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be rebuilt for this attempt
    #[error("request could not be prepared: {message}")]
    Request { message: String },
}

impl AttemptFailure {
    /// Status code for response-backed failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Timeout { .. } | Self::Request { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(err) => err.is_timeout(),
            Self::Status { .. } | Self::Request { .. } => false,
        }
    }

    /// The retryable response, if the last failure was one
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Status { response, .. } => Some(*response),
            _ => None,
        }
    }
}

/// Terminal failure of one resilient call
#[derive(Debug, Error)]
pub enum CallError {
    /// The breaker for `key` is tripped; no request was sent
    #[error("{label} circuit \"{key}\" open until {}", format_instant(.opens_at))]
    CircuitOpen { label: String, key: String, open_until: Instant, opens_at: DateTime<Utc> },

    /// The caller's cancellation token fired
    #[error("{label} request cancelled by caller")]
    Cancelled { label: String },

    /// Every attempt failed with a retryable outcome
    #[error("{label} request exhausted retries after {attempts} attempt(s)")]
    ExhaustedRetries {
        label: String,
        attempts: u32,
        #[source]
        last: Option<AttemptFailure>,
    },

    /// An attempt failed and the classifier declined to retry it
    #[error("{label} request failed")]
    Failed {
        label: String,
        #[source]
        source: AttemptFailure,
    },

    /// The request could not be built or replayed; nothing was sent
    #[error("{label} request is invalid: {message}")]
    InvalidRequest { label: String, message: String },
}

impl CallError {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. })
    }

    /// Diagnostic label of the call that failed
    pub fn label(&self) -> &str {
        match self {
            Self::CircuitOpen { label, .. }
            | Self::Cancelled { label }
            | Self::ExhaustedRetries { label, .. }
            | Self::Failed { label, .. }
            | Self::InvalidRequest { label, .. } => label,
        }
    }

    /// The underlying attempt failure, when one exists
    pub fn attempt_failure(&self) -> Option<&AttemptFailure> {
        match self {
            Self::ExhaustedRetries { last, .. } => last.as_ref(),
            Self::Failed { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn format_instant(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
