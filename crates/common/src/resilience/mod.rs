//! Resilience primitives for outbound calls
//!
//! This module provides the transport-independent pieces of the outbound
//! call layer:
//! - **Circuit Registry**: per-destination consecutive-failure counters that
//!   trip into a cooldown ([`CircuitRegistry`])
//! - **Backoff**: exponential delay schedule between attempts
//!   ([`backoff_delay`])
//! - **Clock**: monotonic time source with a controllable mock for tests
//!
//! The HTTP executor that drives these lives in `cleanops-infra::http`.

pub mod backoff;
pub mod circuit_breaker;
pub mod clock;

pub use backoff::{backoff_delay, backoff_schedule};
pub use circuit_breaker::{
    BreakerSettings, BreakerState, CircuitRegistry, ConfigError, ConfigResult,
};
pub use clock::{Clock, MockClock, SystemClock};
