//! # Core Domain Entities
//!
//! The four persisted entities of the audit trail plus the `Ticket` handle
//! used to track ledger submissions.
//!
//! ## Clusters
//!
//! - **Identity**: `ComplaintId`, `EventType`, `Hash`, `Address`
//! - **Submission**: `Ticket`, `TicketMetadata`, `SubmissionStatus`
//! - **Audit Trail**: `ComplaintEvent`, `EvidenceRecord`, `SlaDeadline`,
//!   `TransactionReceipt`

use crate::errors::ValidationError;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (Keccak-256 for events, SHA-256 for evidence files).
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style account address.
pub type Address = [u8; 20];

/// Identifier of a ledger submission ticket.
pub type TicketId = Uuid;

/// Render bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 32-byte hash from hex, with or without the `0x` prefix.
pub fn parse_hash(value: &str) -> Option<Hash> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}

/// Validated complaint identifier (the report service's tracking id).
///
/// Non-empty, at most [`ComplaintId::MAX_LEN`] characters, ASCII
/// alphanumerics plus `-` and `_`. The charset keeps the id safe to use as
/// a storage path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(String);

impl ComplaintId {
    /// Maximum accepted length.
    pub const MAX_LEN: usize = 100;

    /// Validate and wrap a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyComplaintId);
        }
        if raw.len() > Self::MAX_LEN {
            return Err(ValidationError::ComplaintIdTooLong {
                len: raw.len(),
                max: Self::MAX_LEN,
            });
        }
        if let Some(ch) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValidationError::InvalidComplaintIdChar { ch });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComplaintId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Complaint lifecycle transitions recorded on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Created,
    Assigned,
    StatusUpdated,
    Escalated,
    Resolved,
    EvidenceAdded,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 6] = [
        EventType::Created,
        EventType::Assigned,
        EventType::StatusUpdated,
        EventType::Escalated,
        EventType::Resolved,
        EventType::EvidenceAdded,
    ];

    /// Wire name as stored on the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Created => "CREATED",
            EventType::Assigned => "ASSIGNED",
            EventType::StatusUpdated => "STATUS_UPDATED",
            EventType::Escalated => "ESCALATED",
            EventType::Resolved => "RESOLVED",
            EventType::EvidenceAdded => "EVIDENCE_ADDED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEventType(s.to_string()))
    }
}

// =============================================================================
// CLUSTER B: SUBMISSION
// =============================================================================

/// Status shared by tickets, complaint events and evidence records.
///
/// ```text
/// [PENDING] ──broadcast──→ [SUBMITTED] ──depth reached──→ [CONFIRMED]
///     │                         │
///     └──permanent error──→ [FAILED] ←──retries exhausted / revert
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Submitted,
    Confirmed,
    Failed,
}

impl SubmissionStatus {
    /// CONFIRMED and FAILED never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Confirmed | SubmissionStatus::Failed)
    }

    /// Position in the lifecycle; projections only ever move to a higher rank.
    pub fn rank(&self) -> u8 {
        match self {
            SubmissionStatus::Pending => 0,
            SubmissionStatus::Submitted => 1,
            SubmissionStatus::Confirmed | SubmissionStatus::Failed => 2,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Submitted => "SUBMITTED",
            SubmissionStatus::Confirmed => "CONFIRMED",
            SubmissionStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// What a ticket anchors on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    Event(EventType),
    Evidence,
    SlaDeadline,
}

impl TicketKind {
    pub fn label(&self) -> &'static str {
        match self {
            TicketKind::Event(event_type) => event_type.as_str(),
            TicketKind::Evidence => "EVIDENCE",
            TicketKind::SlaDeadline => "SLA_DEADLINE",
        }
    }
}

/// Submission metadata bound to a ticket alongside its payload hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMetadata {
    pub complaint_id: ComplaintId,
    pub kind: TicketKind,
}

impl TicketMetadata {
    pub fn new(complaint_id: ComplaintId, kind: TicketKind) -> Self {
        Self { complaint_id, kind }
    }
}

/// Block that included a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReference {
    pub number: u64,
    pub hash: Hash,
}

/// Execution outcome reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Receipt of an included transaction.
///
/// Owned by the transaction submitter; other components hold copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: Hash,
    pub block_reference: BlockReference,
    pub status: ReceiptStatus,
    pub confirmations_seen: u64,
    pub gas_used: u64,
}

/// Why a ticket reached FAILED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketFailure {
    /// The ledger rejected the transaction outright (e.g. insufficient funds).
    Rejected { reason: String },
    /// The transaction was included but execution reverted.
    Reverted { tx_hash: Hash },
    /// Never confirmed after every fee-bumped replacement.
    RetriesExhausted { replacements: u32 },
    /// Transient broadcast errors outlasted the retry budget.
    BroadcastExhausted { attempts: u32, last_error: String },
}

impl fmt::Display for TicketFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketFailure::Rejected { reason } => write!(f, "rejected by ledger: {reason}"),
            TicketFailure::Reverted { tx_hash } => {
                write!(f, "execution reverted in {}", to_hex(tx_hash))
            }
            TicketFailure::RetriesExhausted { replacements } => {
                write!(f, "unconfirmed after {replacements} fee-bumped replacements")
            }
            TicketFailure::BroadcastExhausted {
                attempts,
                last_error,
            } => write!(f, "broadcast failed {attempts} times: {last_error}"),
        }
    }
}

/// Handle for an in-flight or completed ledger submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub payload_hash: Hash,
    pub metadata: TicketMetadata,
    pub status: SubmissionStatus,
    /// Account nonce, assigned on first broadcast and kept across replacements.
    pub nonce: Option<u64>,
    /// Hash of the most recent broadcast.
    pub tx_hash: Option<Hash>,
    /// Every hash ever broadcast for this ticket, oldest first.
    pub broadcast_hashes: Vec<Hash>,
    pub gas_price: u128,
    pub replacements: u32,
    pub created_at: Timestamp,
    pub submitted_at: Option<Timestamp>,
    pub last_broadcast_at: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub receipt: Option<TransactionReceipt>,
    pub failure: Option<TicketFailure>,
}

impl Ticket {
    /// A fresh PENDING ticket.
    pub fn pending(payload_hash: Hash, metadata: TicketMetadata, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload_hash,
            metadata,
            status: SubmissionStatus::Pending,
            nonce: None,
            tx_hash: None,
            broadcast_hashes: Vec::new(),
            gas_price: 0,
            replacements: 0,
            created_at,
            submitted_at: None,
            last_broadcast_at: None,
            confirmed_at: None,
            receipt: None,
            failure: None,
        }
    }

    pub fn complaint_id(&self) -> &ComplaintId {
        &self.metadata.complaint_id
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// =============================================================================
// CLUSTER C: AUDIT TRAIL
// =============================================================================

/// One lifecycle transition of a complaint, as mirrored off-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintEvent {
    /// Per-complaint sequence number, assigned on append, strictly increasing.
    pub seq: u64,
    pub complaint_id: ComplaintId,
    pub event_type: EventType,
    pub payload_hash: Hash,
    pub ticket_id: TicketId,
    pub tx_hash: Option<Hash>,
    pub status: SubmissionStatus,
    pub created_at: Timestamp,
    pub submitted_at: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub receipt: Option<TransactionReceipt>,
}

impl ComplaintEvent {
    /// A PENDING event bound to `ticket_id`; `seq` is assigned by the mirror.
    pub fn pending(
        complaint_id: ComplaintId,
        event_type: EventType,
        payload_hash: Hash,
        ticket_id: TicketId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            seq: 0,
            complaint_id,
            event_type,
            payload_hash,
            ticket_id,
            tx_hash: None,
            status: SubmissionStatus::Pending,
            created_at,
            submitted_at: None,
            confirmed_at: None,
            receipt: None,
        }
    }
}

/// Anchored evidence file. At most one per (complaint_id, file_hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub complaint_id: ComplaintId,
    /// SHA-256 of the file content.
    pub file_hash: Hash,
    /// Content-addressed location, relative to the evidence root.
    pub storage_path: String,
    pub ticket_id: TicketId,
    pub tx_hash: Option<Hash>,
    pub status: SubmissionStatus,
    pub created_at: Timestamp,
    pub anchored_at: Option<Timestamp>,
    pub file_size: u64,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    /// Set once an integrity verification succeeded.
    pub verified: bool,
}

/// Position of a complaint in the SLA state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaState {
    NoDeadline,
    Active,
    Escalated,
}

/// Resolution deadline of a complaint.
///
/// `deadline_ts` never decreases; `escalated` only moves false → true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaDeadline {
    pub complaint_id: ComplaintId,
    pub deadline_ts: Timestamp,
    pub escalated: bool,
    pub escalated_at: Option<Timestamp>,
    /// Number of forward extensions after the initial deadline.
    pub extensions: u32,
    /// Ticket anchoring the current deadline on the ledger, once known.
    pub anchor_ticket: Option<TicketId>,
    pub created_at: Timestamp,
}

impl SlaDeadline {
    pub fn state(&self) -> SlaState {
        if self.escalated {
            SlaState::Escalated
        } else {
            SlaState::Active
        }
    }
}
