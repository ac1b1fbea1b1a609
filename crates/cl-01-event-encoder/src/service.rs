//! # Event Encoder Service
//!
//! Implements `EventEncoderApi`. Validation happens here; serialization and
//! hashing are delegated to the domain layer.

use crate::domain::{canonical_bytes, keccak256, whitelist, EncodedEvent};
use crate::error::{EncoderError, EncoderResult};
use crate::ports::inbound::EventEncoderApi;
use serde_json::{Map, Value};
use shared_types::{ComplaintId, EventType, Timestamp};
use tracing::debug;

/// Stateless encoder service.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEncoderService;

impl EventEncoderService {
    pub fn new() -> Self {
        Self
    }
}

impl EventEncoderApi for EventEncoderService {
    fn encode(
        &self,
        complaint_id: &str,
        event_type: &str,
        payload: &Value,
        timestamp: Timestamp,
    ) -> EncoderResult<EncodedEvent> {
        encode(complaint_id, event_type, payload, timestamp)
    }

    fn encode_typed(
        &self,
        complaint_id: &ComplaintId,
        event_type: EventType,
        payload: &Value,
        timestamp: Timestamp,
    ) -> EncoderResult<EncodedEvent> {
        encode_typed(complaint_id, event_type, payload, timestamp)
    }
}

/// Validate raw identifiers, then encode.
pub fn encode(
    complaint_id: &str,
    event_type: &str,
    payload: &Value,
    timestamp: Timestamp,
) -> EncoderResult<EncodedEvent> {
    let complaint_id = ComplaintId::parse(complaint_id)?;
    let event_type: EventType = event_type.parse()?;
    encode_typed(&complaint_id, event_type, payload, timestamp)
}

/// Encode an event with already-validated identifiers.
pub fn encode_typed(
    complaint_id: &ComplaintId,
    event_type: EventType,
    payload: &Value,
    timestamp: Timestamp,
) -> EncoderResult<EncodedEvent> {
    let Value::Object(fields) = payload else {
        return Err(EncoderError::PayloadNotObject {
            found: json_kind(payload),
        });
    };

    let mut data = Map::new();
    let mut dropped_fields = Vec::new();
    for (key, value) in fields {
        if whitelist::is_allowed(event_type, key) {
            data.insert(key.clone(), value.clone());
        } else {
            dropped_fields.push(key.clone());
        }
    }
    dropped_fields.sort();

    let mut document = Map::new();
    document.insert(
        "complaint_id".into(),
        Value::String(complaint_id.as_str().to_string()),
    );
    document.insert("data".into(), Value::Object(data));
    document.insert(
        "event_type".into(),
        Value::String(event_type.as_str().to_string()),
    );
    document.insert("timestamp".into(), Value::from(timestamp));

    let canonical_bytes = canonical_bytes(&Value::Object(document));
    let hash = keccak256(&canonical_bytes);

    if !dropped_fields.is_empty() {
        debug!(
            complaint_id = %complaint_id,
            event_type = %event_type,
            dropped = ?dropped_fields,
            "Dropped non-whitelisted payload fields"
        );
    }

    Ok(EncodedEvent {
        complaint_id: complaint_id.clone(),
        event_type,
        timestamp,
        hash,
        canonical_bytes,
        dropped_fields,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
