//! Upload metadata.

/// Descriptive fields supplied with an upload. Not part of the content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceMetadata {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl EvidenceMetadata {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
        }
    }
}
