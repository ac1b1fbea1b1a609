//! Content addressing.
//!
//! ```text
//! <root>/<complaint_id>/<sha256 hex>
//! ```
//!
//! The complaint id charset is restricted at parse time, so the relative
//! path can never escape the evidence root.

use sha2::{Digest, Sha256};
use shared_types::{ComplaintId, Hash};

/// SHA-256 of the file content.
pub fn content_hash(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Storage location relative to the evidence root.
pub fn storage_path(complaint_id: &ComplaintId, file_hash: &Hash) -> String {
    format!("{}/{}", complaint_id.as_str(), hex::encode(file_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(content_hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_storage_path_layout() {
        let id = ComplaintId::parse("RT000001").unwrap();
        let path = storage_path(&id, &content_hash(b"abc"));
        assert_eq!(
            path,
            "RT000001/ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
