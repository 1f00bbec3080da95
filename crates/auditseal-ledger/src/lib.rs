//! # AuditSeal Audit Ledger
//!
//! Append-only, hash-chained sequence of audit records with periodic Merkle
//! aggregation. The ledger is what makes audit records tamper-evident: each
//! record commits to its predecessor's hash, and every `batch_size` appends
//! the record hashes of that batch are sealed under a Merkle root, giving
//! O(log n) inclusion proofs against a single digest.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Retroactive edit | A past record's field altered | Hash chain: every later link breaks |
//! | Deletion / reorder | Records removed or shuffled | Positions are total and immutable; chain breaks |
//! | Forged inclusion | "This record was in batch j" | Merkle proof replay against the sealed root |
//! | Split view | Different ledgers shown to different auditors | Sealed roots are anchorable externally |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       AUDIT LEDGER                         │
//! │                                                            │
//! │  genesis ── r0 ── r1 ── r2 ── r3 ── r4 ── r5 ── r6 ── r7   │
//! │  (64 x 0)  └──────┬──────┘    └──────┬──────┘    └──┬──┘   │
//! │                tree 0              tree 1          OPEN    │
//! │               (SEALED)            (SEALED)         batch   │
//! │                  │                   │                     │
//! │               root 0              root 1                   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! A batch is `OPEN` while records accumulate and `SEALED` once its tree is
//! built; sealed roots never change. Records in the open batch are chained
//! but have no inclusion proof yet ([`LedgerError::NotSealed`]).
//!
//! ## Hashing discipline
//!
//! Record hashes are digests of the record's canonical encoding (all fields
//! except `record_hash`, absent optionals as null). Merkle leaves are record
//! hashes, and every combine step hashes the concatenation of the two child
//! *hex strings*. Proofs emitted here verify under any implementation that
//! follows the same rule, and vice versa.
//!
//! ## Thread Safety
//!
//! [`AuditLedger`] is not internally synchronized. The intended deployment is
//! a single logical writer behind a reader-writer lock: `append` under the
//! write guard, everything else under the read guard. `&mut self` on
//! `append` makes the compiler enforce exactly that discipline.
//!
//! ## Example
//!
//! ```rust
//! use auditseal_ledger::{AuditLedger, AuditRecord};
//! use chrono::{TimeZone, Utc};
//!
//! let mut ledger = AuditLedger::with_batch_size(2);
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! for i in 0..2 {
//!     let record = AuditRecord::new(
//!         format!("rec-{i}"),
//!         format!("evt-{i}"),
//!         ts,
//!         "object.create",
//!         "tenant-1",
//!         "bucket",
//!     );
//!     ledger.append(record).unwrap();
//! }
//!
//! assert!(ledger.verify_chain_integrity());
//! assert_eq!(ledger.sealed_tree_count(), 1);
//!
//! let proof = ledger.generate_inclusion_proof("rec-0").unwrap();
//! assert!(proof.verify());
//! ```

pub mod error;
pub mod ledger;
pub mod merkle;
pub mod record;

pub use error::{LedgerError, Result};
pub use ledger::{AuditLedger, DEFAULT_BATCH_SIZE};
pub use merkle::{MerkleProof, MerkleTree, ProofSide};
pub use record::AuditRecord;
