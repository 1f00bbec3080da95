//! SHA-256 content digests in the hex-string domain.
//!
//! Every digest in AuditSeal is a lowercase hex string of 64 characters.
//! Leaf hashes and Merkle internal hashes live in the same domain: combining
//! two digests hashes the concatenation of the two hex strings. See the
//! crate-level documentation for why this is frozen.

use crate::json::canonicalize;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// The previous-hash value of the first record in a ledger: 64 ASCII zeros.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Computes the SHA-256 digest of a byte slice as lowercase hex.
///
/// # Example
///
/// ```rust
/// use auditseal_canonical::sha256_hex;
///
/// let digest = sha256_hex(b"");
/// assert_eq!(
///     digest,
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(DIGEST_HEX_LEN);
    for byte in digest {
        write!(out, "{:02x}", byte).expect("writing hex to a String cannot fail");
    }
    out
}

/// Canonicalizes a JSON value and digests the canonical bytes.
///
/// This is the single path from structured data to a commitment: policy
/// commitments and record hashes are both `hash_value` of their canonical
/// tree.
pub fn hash_value(value: &serde_json::Value) -> String {
    sha256_hex(canonicalize(value).as_bytes())
}

/// Combines two digests into a parent digest.
///
/// The concatenation is of the hex *strings*, not of decoded bytes. Merkle
/// proofs replay this exact rule, so it must match on every implementation
/// that exchanges proofs with this one.
///
/// # Example
///
/// ```rust
/// use auditseal_canonical::{combine_hex, sha256_hex};
///
/// let left = sha256_hex(b"left");
/// let right = sha256_hex(b"right");
/// let parent = combine_hex(&left, &right);
///
/// assert_eq!(parent, sha256_hex(format!("{}{}", left, right).as_bytes()));
/// ```
pub fn combine_hex(left: &str, right: &str) -> String {
    let mut combined = String::with_capacity(left.len() + right.len());
    combined.push_str(left);
    combined.push_str(right);
    sha256_hex(combined.as_bytes())
}

/// Returns true if `s` is a well-formed digest: 64 lowercase hex characters.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_is_64_lowercase_hex() {
        let digest = sha256_hex(b"auditseal");
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(is_hex_digest(&digest));
    }

    #[test]
    fn genesis_is_well_formed() {
        assert_eq!(GENESIS_HASH.len(), DIGEST_HEX_LEN);
        assert!(GENESIS_HASH.bytes().all(|b| b == b'0'));
        assert!(is_hex_digest(GENESIS_HASH));
    }

    #[test]
    fn hash_value_is_deterministic_across_key_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(hash_value(&a), hash_value(&b));
    }

    #[test]
    fn hash_value_differs_on_content() {
        assert_ne!(hash_value(&json!({"x": 1})), hash_value(&json!({"x": 2})));
    }

    #[test]
    fn combine_is_order_sensitive() {
        let l = sha256_hex(b"l");
        let r = sha256_hex(b"r");
        assert_ne!(combine_hex(&l, &r), combine_hex(&r, &l));
    }

    #[test]
    fn combine_matches_string_concatenation() {
        let l = sha256_hex(b"l");
        let r = sha256_hex(b"r");
        let expected = sha256_hex(format!("{}{}", l, r).as_bytes());
        assert_eq!(combine_hex(&l, &r), expected);
    }

    #[test]
    fn rejects_malformed_digests() {
        assert!(!is_hex_digest(""));
        assert!(!is_hex_digest("abc"));
        assert!(!is_hex_digest(&"A".repeat(64)));
        assert!(!is_hex_digest(&"g".repeat(64)));
        assert!(!is_hex_digest(&"0".repeat(63)));
        assert!(!is_hex_digest(&"0".repeat(65)));
    }
}
