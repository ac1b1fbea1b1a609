//! # Event Encoder
//!
//! Turns a complaint lifecycle transition into a canonical byte string and
//! its Keccak-256 hash. The hash is what gets anchored on the ledger, so the
//! encoding must be byte-for-byte reproducible by any auditor.
//!
//! ## Canonical Document
//!
//! ```text
//! {"complaint_id":"RT000001","data":{...whitelisted...},"event_type":"CREATED","timestamp":1717171717}
//! ```
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | Keys sorted at every depth | `domain/canonical.rs` `write_value` |
//! | No insignificant whitespace | `domain/canonical.rs` |
//! | Non-ASCII escaped as `\uXXXX` | `domain/canonical.rs` `write_string` |
//! | Integer second timestamps | `Timestamp = u64` |
//! | Payload fields whitelisted per event type | `domain/whitelist.rs` |
//!
//! The encoder is pure: no I/O, no clock, no randomness.
//!
//! ## Module Structure
//!
//! ```text
//! ports/inbound.rs   - EventEncoderApi trait
//! service.rs         - EventEncoderService (implements the api)
//! domain/canonical.rs - canonical JSON writer + keccak256
//! domain/whitelist.rs - per-event-type field whitelist
//! domain/encoded.rs   - EncodedEvent value object
//! error.rs           - EncoderError
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{canonical_bytes, canonical_hash, keccak256, whitelist, EncodedEvent};
pub use error::{EncoderError, EncoderResult};
pub use ports::inbound::EventEncoderApi;
pub use service::{encode, encode_typed, EventEncoderService};
