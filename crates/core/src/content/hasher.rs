//! Content-addressed identifiers for files and links.

use sha2::{Digest, Sha256};

/// Compute a stable identifier for the given input.
/// Uses SHA-256 over the UTF-8 bytes, so the same input yields the same id
/// across processes and runs.
/// Returns a lowercase hex-encoded digest.
pub fn id_for(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_for_consistent() {
        let path = "/content/blog/blog1.md";
        assert_eq!(id_for(path), id_for(path));
    }

    #[test]
    fn test_id_for_different_input() {
        assert_ne!(id_for("/content/blog/blog1.md"), id_for("/content/blog/blog2.md"));
    }

    #[test]
    fn test_id_for_known_digest() {
        assert_eq!(
            id_for("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_id_for_length() {
        // 256-bit digest as 64 hex chars
        assert_eq!(id_for("").len(), 64);
    }
}
