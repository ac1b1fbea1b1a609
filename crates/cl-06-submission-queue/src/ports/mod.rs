//! Ports layer for the submission queue.
//!
//! - Inbound: `SubmissionQueueApi`
//! - Outbound: `TaskExecutor` (implemented by the runtime over the
//!   transaction submitter)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
