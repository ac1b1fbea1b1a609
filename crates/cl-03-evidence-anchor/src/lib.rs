//! # Evidence Anchor
//!
//! Content-addresses uploaded evidence files, stores them durably and
//! anchors their hash on the ledger through the transaction submitter.
//!
//! ## Anchoring Flow
//!
//! ```text
//! bytes ──sha256──→ (complaint, hash) ──exists?──yes──→ existing record
//!                                          │ no
//!                         per-key lock ────┤
//!                                          ↓
//!            store <root>/<complaint>/<hex> (tmp + fsync + rename)
//!                                          ↓
//!                          AnchorSubmitter::submit_anchor
//!                                          ↓
//!                          [PENDING] ──apply_ticket──→ [CONFIRMED]
//! ```
//!
//! | Operation | Method | Ledger interaction |
//! |-----------|--------|--------------------|
//! | Anchor | `anchor()` / `anchor_with_metadata()` | At most one ticket per (complaint, hash) |
//! | Status | `apply_ticket()` | None, mirrors submitter events |
//! | Verify | `verify()` | None, re-reads and re-hashes the stored copy |
//!
//! A file that could not be persisted is never anchored. A FAILED record is
//! re-anchored with a fresh ticket on the next upload of the same content.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - LocalFileStore                                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - EvidenceAnchorApi                          │
//! │  ports/outbound.rs - EvidenceStore, AnchorSubmitter             │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/content.rs  - SHA-256, storage layout                   │
//! │  service.rs         - EvidenceAnchor                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::LocalFileStore;
pub use domain::{content_hash, storage_path, EvidenceMetadata};
pub use error::{EvidenceError, EvidenceResult};
pub use ports::inbound::EvidenceAnchorApi;
pub use ports::outbound::{AnchorSubmitter, EvidenceStore, StorageError, StoredFile};
pub use service::EvidenceAnchor;
