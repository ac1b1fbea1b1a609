//! # Ledger Mirror
//!
//! Off-chain, read-optimised projection of complaint events and their
//! receipts. Queries never touch the remote ledger.
//!
//! ## Table Layout
//!
//! ```text
//! logs:       complaint_id → [seq 1, seq 2, seq 3, ...]   (per-complaint lock)
//! by_ticket:  ticket_id    → (complaint_id, seq)
//! by_payload: payload_hash → (complaint_id, seq)
//! ```
//!
//! | Operation | Method | Notes |
//! |-----------|--------|-------|
//! | Append | `append()` | Assigns the next `seq`; one event per ticket |
//! | Append + follow-up | `append_then()` | Follow-up runs under the complaint's lock |
//! | Project | `apply_ticket()` | Status only moves forward |
//! | Resubmit | `rebind_ticket()` | FAILED event moves to its new ticket |
//! | Query | `query_events()`, `confirmed_events()` | Sequence order |
//! | Lookup | `find_event()` | Payload hash within one complaint |
//! | Reconcile | `reconcile()` | Refresh SUBMITTED events older than `stale_after_secs` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - LedgerMirrorApi                            │
//! │  ports/outbound.rs - ReceiptSource                              │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/log.rs    - ComplaintLog, ticket projection             │
//! │  domain/report.rs - ReconcileReport                             │
//! │  service.rs       - LedgerMirror                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{ComplaintLog, MirrorConfig, ReconcileFailure, ReconcileReport};
pub use error::{MirrorError, MirrorResult};
pub use ports::inbound::LedgerMirrorApi;
pub use ports::outbound::ReceiptSource;
pub use service::LedgerMirror;
