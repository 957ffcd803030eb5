//! SHA-256 content hashing for version records.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Canonical content hash of a serializable document.
///
/// serde_json writes struct fields in declaration order and sorts map
/// keys, so equal documents always produce equal hashes.
pub fn content_hash<T: Serialize>(doc: &T) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(&serde_json::to_vec(doc)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn equal_documents_hash_equal() {
        let a = serde_json::json!({"title": "Home", "blocks": [1, 2]});
        let b = serde_json::json!({"blocks": [1, 2], "title": "Home"});
        // Value maps sort keys, so insertion order does not matter
        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn different_documents_hash_different() {
        let a = serde_json::json!({"title": "Home"});
        let b = serde_json::json!({"title": "About"});
        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
        assert_eq!(content_hash(&a).unwrap().len(), 64);
    }
}
