//! Adapters for the submitter's outbound ports.
//!
//! - `JsonRpcLedger`: Ethereum JSON-RPC over HTTP (reqwest)
//! - `InMemoryLedger`: deterministic simulated ledger with fault injection
//! - `LocalKeySigner`: secp256k1 key held in process memory

pub mod in_memory;
pub mod json_rpc;
pub mod local_signer;

pub use in_memory::InMemoryLedger;
pub use json_rpc::JsonRpcLedger;
pub use local_signer::LocalKeySigner;
