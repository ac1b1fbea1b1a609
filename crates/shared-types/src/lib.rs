//! # Shared Types Crate
//!
//! This crate contains the audit-trail entities, identifiers and the error
//! taxonomy used by every component of the complaint ledger.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Append/Update Only**: Entities are never deleted; status fields only
//!   move forward (`SubmissionStatus::rank`).
//! - **Validated Identifiers**: A `ComplaintId` can only be obtained through
//!   `ComplaintId::parse`, so every component receives a safe identifier.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
