//! Ports layer for the SLA tracker.
//!
//! - Inbound: `SlaTrackerApi`
//! - Outbound: `EscalationSink` (implemented by the runtime)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
