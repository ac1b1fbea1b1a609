//! # Runtime Wiring
//!
//! Background loops started by `ComplaintLedger::start`.

pub mod scheduler;

pub use scheduler::{
    escalate_overdue, reconcile_once, run_escalation_job, run_reconciler,
};
