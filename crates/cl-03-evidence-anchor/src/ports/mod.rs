//! Ports layer for the evidence anchor.
//!
//! - Inbound: `EvidenceAnchorApi`
//! - Outbound: `EvidenceStore` (file persistence), `AnchorSubmitter`
//!   (ledger submission, implemented by the runtime)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
