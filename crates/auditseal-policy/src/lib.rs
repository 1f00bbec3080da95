//! # AuditSeal Policy Canonicalizer & Commitment Store
//!
//! Transforms human-authored compliance policies into a canonical byte
//! sequence, commits to that sequence with a SHA-256 digest, and tracks the
//! version history per policy identity. Audit records bind to the digest, so
//! an auditor holding a record and the policy text can independently confirm
//! which policy was in force when the record was written.
//!
//! ## Threat Model
//!
//! Policy commitments defend against:
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Retroactive edit | Policy text silently rewritten after the fact | Commitment digest bound into records |
//! | Semantic ambiguity | Same policy, different serializations | Canonical form (sorted sets, sorted keys) |
//! | Version confusion | "Current" policy substituted at audit time | Records address by digest, never by "current" |
//!
//! ## Canonicalization
//!
//! A policy's statements are sorted by `Sid`; within each statement the
//! action, resource and principal sets are sorted and the condition map is
//! emitted with sorted keys. The resulting tree is encoded with
//! [`auditseal_canonical::canonicalize`] and digested. Two policies that
//! agree semantically therefore produce identical canonical bytes and
//! identical commitments, regardless of how their sets were ordered at
//! authoring time.
//!
//! Free-form policy metadata is an annotation, not part of the committed
//! content; it never enters the canonical form.
//!
//! ## Usage
//!
//! ```rust
//! use auditseal_policy::{Policy, PolicyAction, PolicyCompiler, PolicyEffect, PolicyStatement};
//!
//! let mut compiler = PolicyCompiler::new();
//!
//! let policy = Policy::new("pol-1", "1.0", "retention")
//!     .with_statement(PolicyStatement::new(
//!         "stmt-1",
//!         PolicyEffect::Allow,
//!         vec![PolicyAction::Read, PolicyAction::Write],
//!         vec!["bucket/a".to_string()],
//!     ));
//!
//! let canonical = compiler.compile(&policy).unwrap();
//! assert_eq!(canonical.commitment_hash.len(), 64);
//! assert!(compiler.verify_commitment("pol-1", &canonical.commitment_hash));
//! ```
//!
//! ## Thread Safety
//!
//! [`PolicyCompiler`] is not internally synchronized. Shared deployments wrap
//! it in a reader-writer lock: `compile` under the write guard, lookups under
//! the read guard.

pub mod compiler;
pub mod error;
pub mod model;

pub use compiler::{CanonicalPolicy, PolicyCompiler};
pub use error::{PolicyError, Result};
pub use model::{Policy, PolicyAction, PolicyEffect, PolicyStatement};
