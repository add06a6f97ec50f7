//! # CleanOps Domain
//!
//! Domain types shared by the CleanOps outbound-call gateway.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures for outbound calls, alerts and logging
//!
//! ## Architecture
//! - No dependencies on other CleanOps crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod errors;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
