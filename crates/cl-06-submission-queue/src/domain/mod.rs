//! # Domain Layer - Submission Queue
//!
//! - `task`: the unit of work
//! - `config`: worker and capacity limits
//! - `stats`: counters snapshot

pub mod config;
pub mod stats;
pub mod task;

pub use config::QueueConfig;
pub use stats::QueueStats;
pub use task::SubmissionTask;
