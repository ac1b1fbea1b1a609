//! # Ledger Runtime
//!
//! Composition root of the complaint ledger. The `ledger-runtime` binary is
//! a thin wrapper around [`ComplaintLedger`].
//!
//! ## Wiring
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                          ComplaintLedger                               │
//! │                                                                        │
//! │  submit_event ──→ cl-01 encode ──┐                                     │
//! │  anchor_evidence ──→ cl-03 ──────┼──→ SubmissionPipeline               │
//! │  set_sla_deadline ──→ cl-04 ─────┘      reserve (cl-02)                │
//! │                                         append  (cl-05)                │
//! │                                         enqueue (cl-06) ──→ broadcast  │
//! │                                                                        │
//! │  background: confirmation poller │ ticket update handler               │
//! │              mirror reconciler   │ escalation scheduler                │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: components define ports, this crate
//!   provides the adapters that bind them together
//! - **EDA**: ticket transitions reach the mirror and evidence records
//!   through the event bus

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod access;
pub mod adapters;
pub mod container;
pub mod handlers;
pub mod ledger;
pub mod wiring;

pub use access::AccessPolicy;
pub use container::{ConfigError, LedgerBackend, LedgerComponents, LedgerConfig, LedgerMode};
pub use ledger::ComplaintLedger;
