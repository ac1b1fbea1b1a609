//! Adapters binding component ports to one another.

pub mod escalation;
pub mod pipeline;
pub mod submission;

pub use escalation::{deadline_anchor_hash, LedgerEscalationSink};
pub use pipeline::SubmissionPipeline;
pub use submission::{
    evidence_anchor_hash, BroadcastExecutor, PipelineAnchorSubmitter, SubmitterReceipts,
};
