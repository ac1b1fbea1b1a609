//! # Domain Layer - Evidence Anchor
//!
//! - `content`: SHA-256 content addressing and storage layout
//! - `metadata`: optional descriptive fields recorded with a file

pub mod content;
pub mod metadata;

pub use content::{content_hash, storage_path};
pub use metadata::EvidenceMetadata;
