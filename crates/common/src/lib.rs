//! Modular common utilities shared across CleanOps crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error and time types without side effects
//! - `observability`: tracing instrumentation
//! - `runtime`: resilience primitives (circuit registry, backoff, clocks)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use resilience::{BreakerSettings, BreakerState, CircuitRegistry, Clock, MockClock, SystemClock};
