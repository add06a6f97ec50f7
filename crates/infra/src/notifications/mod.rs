//! Outbound notifications built on the resilient HTTP client

pub mod slack;

pub use slack::{Delivery, PaymentAlert, SlackNotifier};
