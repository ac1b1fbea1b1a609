//! # Domain Layer - SLA Tracker
//!
//! - `deadline`: the NO_DEADLINE → ACTIVE → ESCALATED transitions
//! - `status`: read-only status projection

pub mod deadline;
pub mod status;

pub use deadline::{plan_deadline, should_escalate, DeadlineChange};
pub use status::SlaStatus;
