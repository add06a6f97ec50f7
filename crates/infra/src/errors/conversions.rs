//! Conversions from external infrastructure errors into domain errors.

use cleanops_domain::CleanOpsError;
use reqwest::Error as HttpError;

use crate::http::CallError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CleanOpsError);

impl From<InfraError> for CleanOpsError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CleanOpsError> for InfraError {
    fn from(value: CleanOpsError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCleanOpsError {
    fn into_cleanops(self) -> CleanOpsError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CleanOpsError */
/* -------------------------------------------------------------------------- */

impl IntoCleanOpsError for HttpError {
    fn into_cleanops(self) -> CleanOpsError {
        if self.is_builder() {
            return CleanOpsError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return CleanOpsError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CleanOpsError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                429 => CleanOpsError::Network(message),
                400..=499 => CleanOpsError::InvalidInput(message),
                _ => CleanOpsError::Network(message),
            };
        }

        CleanOpsError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_cleanops())
    }
}

/* -------------------------------------------------------------------------- */
/* CallError → CleanOpsError */
/* -------------------------------------------------------------------------- */

impl IntoCleanOpsError for CallError {
    fn into_cleanops(self) -> CleanOpsError {
        match self {
            CallError::InvalidRequest { .. } => CleanOpsError::InvalidInput(self.to_string()),
            CallError::ExhaustedRetries { last: Some(ref last), .. } => {
                CleanOpsError::Network(format!("{self}: {last}"))
            }
            CallError::Failed { ref source, .. } => CleanOpsError::Network(format!("{self}: {source}")),
            other => CleanOpsError::Network(other.to_string()),
        }
    }
}

impl From<CallError> for InfraError {
    fn from(value: CallError) -> Self {
        InfraError(value.into_cleanops())
    }
}

impl From<CallError> for CleanOpsError {
    fn from(value: CallError) -> Self {
        value.into_cleanops()
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
