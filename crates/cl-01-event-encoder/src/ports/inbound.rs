//! Inbound port: the API other components use to encode events.

use crate::domain::EncodedEvent;
use crate::error::EncoderResult;
use serde_json::Value;
use shared_types::{ComplaintId, EventType, Timestamp};

/// Event encoding API.
pub trait EventEncoderApi: Send + Sync {
    /// Encode an event from raw, unvalidated inputs.
    fn encode(
        &self,
        complaint_id: &str,
        event_type: &str,
        payload: &Value,
        timestamp: Timestamp,
    ) -> EncoderResult<EncodedEvent>;

    /// Encode an event whose identifiers are already validated.
    fn encode_typed(
        &self,
        complaint_id: &ComplaintId,
        event_type: EventType,
        payload: &Value,
        timestamp: Timestamp,
    ) -> EncoderResult<EncodedEvent>;
}
