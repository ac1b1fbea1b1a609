//! Ports layer for the event encoder.
//!
//! The encoder is pure and has no outbound dependencies.

pub mod inbound;

pub use inbound::*;
