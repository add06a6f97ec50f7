//! Observability setup for gateway processes
//!
//! Outbound calls log through `tracing`; this module installs the subscriber
//! that turns those events into text or JSON lines.

pub mod logging;

pub use logging::init;
