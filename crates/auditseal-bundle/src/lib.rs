//! # AuditSeal Proof Bundles
//!
//! Assembles self-contained compliance proof bundles and provides the
//! reference verifier offline auditors run against them. A bundle packages
//! audit records (in ledger order), their policy-commitment digests, Merkle
//! inclusion proofs for records in sealed batches, and any external
//! anchoring references that witness the covered time span. Everything a
//! third party needs travels inside the bundle; verification requires no
//! trust in, or connectivity to, the producer.
//!
//! ## Bundle variants
//!
//! | Variant | Selection |
//! |---------|-----------|
//! | `single_record` | One record by id |
//! | `batch_records` | A caller-supplied id list; missing ids skipped |
//! | `time_range` | Every record with `start <= timestamp <= end`, optional tenant filter |
//! | `tenant_scope` | Every record of one tenant |
//!
//! ## Verification
//!
//! [`verify_bundle`] replays the record hashes, the chain links between
//! consecutive bundle records, the Merkle proofs, and the well-formedness of
//! every commitment digest, and reports each dimension separately. Bundles
//! assembled from non-contiguous ledger slices fail the chain dimension;
//! such bundles must rely on Merkle proofs instead of claiming chain
//! contiguity.
//!
//! Verification never fails with an error of its own: malformed input shows
//! up inside the report, not as a panic or an `Err`.

pub mod anchor;
pub mod builder;
pub mod bundle;
pub mod verify;

pub use anchor::{AnchorType, AnchoringReference};
pub use builder::BundleBuilder;
pub use bundle::{BundleType, ComplianceProofBundle};
pub use verify::{verify_bundle, BundleVerification, BundleVerifier, VerificationFailure};
