//! # CleanOps Infrastructure
//!
//! Outbound I/O for the CleanOps backend.
//!
//! This crate contains:
//! - The resilient HTTP client (timeouts, retries, circuit breaking)
//! - Webhook alert notifications
//! - Configuration loading from files and environment variables
//! - Logging setup
//!
//! ## Architecture
//! - Breaker and backoff primitives come from `cleanops-common`
//! - Configuration and error types come from `cleanops-domain`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod notifications;
pub mod observability;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::*;
pub use notifications::{Delivery, PaymentAlert, SlackNotifier};
