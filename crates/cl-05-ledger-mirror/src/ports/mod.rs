//! Ports layer for the ledger mirror.
//!
//! - Inbound: `LedgerMirrorApi`
//! - Outbound: `ReceiptSource` (implemented by the runtime over the
//!   transaction submitter)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
