//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CleanOps
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CleanOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CleanOps operations
pub type Result<T> = std::result::Result<T, CleanOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        let err = CleanOpsError::Network("slack-webhook circuit open".into());
        assert_eq!(err.to_string(), "Network error: slack-webhook circuit open");
    }

    #[test]
    fn serializes_as_tagged_message() {
        let err = CleanOpsError::Config("missing webhook".into());
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing webhook");
    }
}
