//! # Domain Layer - Transaction Submitter
//!
//! - `config`: submitter tuning knobs
//! - `transaction`: unsigned/signed transactions, anchor call data, RLP
//! - `fees`: gas pricing, replace-by-fee bump, retry backoff
//! - `report`: reservation and poll outcomes

pub mod config;
pub mod fees;
pub mod report;
pub mod transaction;

pub use config::SubmitterConfig;
pub use fees::{backoff_delay, bump_gas_price, initial_gas_price};
pub use report::{PollOutcome, PollReport, Reservation};
pub use transaction::{
    anchor_call_data, keccak256, metadata_digest, SignedTransaction, UnsignedTransaction,
    ANCHOR_SELECTOR,
};
