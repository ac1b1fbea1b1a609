//! # Domain Layer - Event Encoder
//!
//! - `canonical`: deterministic JSON writer and Keccak-256
//! - `whitelist`: fields retained per event type
//! - `encoded`: the `EncodedEvent` value object

pub mod canonical;
pub mod encoded;
pub mod whitelist;

pub use canonical::{canonical_bytes, canonical_hash, keccak256};
pub use encoded::EncodedEvent;
