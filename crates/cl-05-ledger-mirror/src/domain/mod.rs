//! # Domain Layer - Ledger Mirror
//!
//! - `log`: per-complaint event log with monotonic sequence numbers
//! - `report`: reconciliation outcome
//! - `config`: staleness threshold

pub mod config;
pub mod log;
pub mod report;

pub use config::MirrorConfig;
pub use log::{project_ticket, rebind, ComplaintLog};
pub use report::{ReconcileFailure, ReconcileReport};
