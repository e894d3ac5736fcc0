//! Content-addressed identity for uploaded documents.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the document bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(content_hash(b"TC-5589"), content_hash(b"TC-5590"));
    }
}
