//! The encoder's output value object.

use shared_types::{to_hex, ComplaintId, EventType, Hash, Timestamp};

/// A canonically encoded, hashed complaint event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    pub complaint_id: ComplaintId,
    pub event_type: EventType,
    pub timestamp: Timestamp,
    /// Keccak-256 of `canonical_bytes`.
    pub hash: Hash,
    pub canonical_bytes: Vec<u8>,
    /// Payload fields removed by the whitelist, sorted.
    pub dropped_fields: Vec<String>,
}

impl EncodedEvent {
    pub fn hash_hex(&self) -> String {
        to_hex(&self.hash)
    }

    /// The canonical document as text. Always valid ASCII.
    pub fn canonical_str(&self) -> &str {
        std::str::from_utf8(&self.canonical_bytes).unwrap_or_default()
    }
}
