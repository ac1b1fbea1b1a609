//! # SLA Tracker
//!
//! Per-complaint resolution deadlines and the escalation trigger.
//!
//! ## State Machine
//!
//! ```text
//! [NO_DEADLINE] ──set_deadline──→ [ACTIVE] ──check_escalation (now > deadline)──→ [ESCALATED]
//!                                  ↺ set_deadline (same or later ts)
//! ```
//!
//! | Operation | Method | Notes |
//! |-----------|--------|-------|
//! | Set / extend | `set_deadline()` | Future only, never earlier, rejected once escalated |
//! | Escalate | `check_escalation()` | True only on the ACTIVE → ESCALATED transition |
//! | Batch | `batch_check_escalation()` | Each id evaluated on its own |
//! | Scan | `overdue()` | ACTIVE deadlines already passed, earliest first |
//! | Read | `status()` | `SlaStatus` with time remaining |
//!
//! Every new or extended deadline is handed to `EscalationSink::deadline_set`
//! for anchoring, and each escalation to `EscalationSink::escalated` exactly
//! once. Sink failures are logged; the state transition stands.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - SlaTrackerApi                              │
//! │  ports/outbound.rs - EscalationSink                             │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/deadline.rs - transition rules                          │
//! │  domain/status.rs   - SlaStatus                                 │
//! │  service.rs         - SlaTracker                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{DeadlineChange, SlaStatus};
pub use error::{SlaError, SlaResult};
pub use ports::inbound::SlaTrackerApi;
pub use ports::outbound::EscalationSink;
pub use service::SlaTracker;
