//! Payload fields retained per event type.
//!
//! Anything outside the list is dropped before hashing so that incidental
//! application fields (request ids, UI hints) never change an anchored hash.

use shared_types::EventType;

const CREATED: &[&str] = &[
    "actor",
    "confidence_score",
    "department",
    "description",
    "issue_title",
    "location",
    "status",
];
const ASSIGNED: &[&str] = &["actor", "assigned_to", "department", "note"];
const STATUS_UPDATED: &[&str] = &["actor", "new_status", "note", "old_status"];
const ESCALATED: &[&str] = &["deadline_ts", "escalated_at", "reason"];
const RESOLVED: &[&str] = &["actor", "resolution", "resolved_by"];
const EVIDENCE_ADDED: &[&str] = &[
    "actor",
    "content_type",
    "file_hash",
    "file_name",
    "storage_path",
];

/// Fields allowed in the payload of `event_type`, sorted.
pub fn allowed_fields(event_type: EventType) -> &'static [&'static str] {
    match event_type {
        EventType::Created => CREATED,
        EventType::Assigned => ASSIGNED,
        EventType::StatusUpdated => STATUS_UPDATED,
        EventType::Escalated => ESCALATED,
        EventType::Resolved => RESOLVED,
        EventType::EvidenceAdded => EVIDENCE_ADDED,
    }
}

pub fn is_allowed(event_type: EventType, field: &str) -> bool {
    allowed_fields(event_type).binary_search(&field).is_ok()
}
