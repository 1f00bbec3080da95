//! # AuditSeal Canonical Encoding & Hashing
//!
//! Deterministic byte-exact serialization and the single content-hash
//! function used by every other AuditSeal component. Policy commitments,
//! audit-record hashes, Merkle leaves and Merkle internal nodes all flow
//! through this crate, so two producers that agree on semantic content are
//! guaranteed to agree on every byte they hash.
//!
//! ## Threat Model
//!
//! Canonical encoding defends against:
//!
//! - **Key Reordering**: JSON objects have no inherent key order; without
//!   canonicalization, semantically identical documents hash differently.
//! - **Whitespace Manipulation**: insignificant whitespace changes the
//!   pre-image without changing meaning.
//! - **Optional-Field Collisions**: omitting an absent field would make
//!   `{a:1}` and `{a:1, b:null}` collide; absent fields are encoded as an
//!   explicit null marker.
//!
//! ## The hex-string hash domain
//!
//! Digests are lowercase hex strings, 64 characters. Combining two digests
//! (Merkle internal nodes, [`combine_hex`]) hashes the concatenation of the
//! two *hex strings*, not the raw bytes they encode. This is a compatibility
//! commitment: proofs emitted by one implementation must verify under
//! another, and the deployed verifiers replay hex-string concatenation.
//! Do not "fix" this to raw-byte concatenation.
//!
//! ## References
//!
//! - **RFC 8785** - "JSON Canonicalization Scheme (JCS)" - the canonical
//!   JSON family this encoding belongs to.
//!   <https://www.rfc-editor.org/rfc/rfc8785>
//! - **NIST FIPS 180-4** - "Secure Hash Standard (SHS)" - SHA-256.
//!   <https://csrc.nist.gov/publications/detail/fips/180/4/final>
//!
//! ## Example
//!
//! ```rust
//! use auditseal_canonical::{canonicalize, hash_value};
//! use serde_json::json;
//!
//! // Semantically identical values canonicalize identically.
//! let a = json!({"b": 1, "a": 2});
//! let b = json!({"a": 2, "b": 1});
//!
//! assert_eq!(canonicalize(&a), canonicalize(&b));
//! assert_eq!(canonicalize(&a), r#"{"a":2,"b":1}"#);
//! assert_eq!(hash_value(&a), hash_value(&b));
//! ```

pub mod digest;
pub mod json;
pub mod time;

pub use digest::{combine_hex, hash_value, is_hex_digest, sha256_hex, DIGEST_HEX_LEN, GENESIS_HASH};
pub use json::canonicalize;
pub use time::{format_ts, ts_millis};
