//! # Transaction Submitter
//!
//! Signs, broadcasts and tracks anchor transactions on the remote ledger.
//! Every other component reaches the ledger through this crate.
//!
//! ## Ticket Lifecycle
//!
//! ```text
//! reserve()          broadcast()             poll_pending()
//! [PENDING] ──nonce+sign+send──→ [SUBMITTED] ──depth reached──→ [CONFIRMED]
//!     │                              │   ↺ timeout: same nonce, fee +bump%
//!     └──permanent error──→ [FAILED] ←──revert / retries exhausted
//! ```
//!
//! | Stage | Method | Effect |
//! |-------|--------|--------|
//! | Reserve | `reserve()` | Dedup on payload hash, PENDING ticket, no I/O |
//! | Broadcast | `broadcast()` | Nonce lock → sign → send → SUBMITTED |
//! | Poll | `poll_pending()` | Receipts, confirmation depth, replace-by-fee |
//! | Refresh | `refresh()` | Receipt check for one ticket, never replaces |
//! | Resubmit | `resubmit()` | New ticket for a FAILED ticket's payload |
//!
//! FAILED tickets are never retried automatically.
//!
//! ## Nonce Discipline
//!
//! A single counter per signing account, guarded by an async mutex held from
//! allocation until the ledger accepted the transaction. `nonce too low`
//! resynchronises the counter from `eth_getTransactionCount(pending)`.
//!
//! ## Status Events
//!
//! `TicketSubmitted`, `TicketConfirmed` and `TicketFailed` are published on
//! the shared bus.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - JsonRpcLedger, InMemoryLedger, LocalKeySigner      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - TransactionSubmitterApi                    │
//! │  ports/outbound.rs - LedgerRpc, TransactionSigner               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/transaction.rs - EIP-155 RLP, anchor call data          │
//! │  domain/fees.rs        - gas price, bump, backoff               │
//! │  service.rs            - TransactionSubmitter                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryLedger, JsonRpcLedger, LocalKeySigner};
pub use domain::{PollOutcome, PollReport, Reservation, SignedTransaction, SubmitterConfig};
pub use error::{SubmitterError, SubmitterResult};
pub use ports::inbound::TransactionSubmitterApi;
pub use ports::outbound::{LedgerReceipt, LedgerRpc, RpcError, SignerError, TransactionSigner};
pub use service::TransactionSubmitter;
