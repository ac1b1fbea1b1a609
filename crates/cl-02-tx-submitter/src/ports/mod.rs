//! Ports layer for the transaction submitter.
//!
//! - Inbound: `TransactionSubmitterApi`, used by the runtime and queue workers
//! - Outbound: `LedgerRpc`, `TransactionSigner`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
