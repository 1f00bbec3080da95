//! The reference bundle verifier.

use crate::bundle::ComplianceProofBundle;
use auditseal_canonical::{is_hex_digest, ts_millis};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// One concrete defect found during verification.
///
/// Failures are data, not control flow: verification always completes and
/// returns every defect it found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationFailure {
    /// A record's stored hash does not match its recomputed hash.
    #[error("record hash mismatch for {record_id}")]
    RecordHashMismatch { record_id: String },

    /// A record's `previous_hash` does not equal its predecessor's hash.
    #[error("chain break at record {record_id}")]
    ChainBroken { record_id: String },

    /// A Merkle proof failed replay against its own root.
    #[error("merkle proof failed replay for leaf {leaf_hash}")]
    ProofInvalid { leaf_hash: String },

    /// A policy commitment is not a well-formed 64-hex digest.
    #[error("malformed policy commitment for {key}")]
    CommitmentMalformed { key: String },

    /// The bundle contradicts itself or the verifier's trusted state.
    #[error("bundle inconsistent: {detail}")]
    Inconsistent { detail: String },
}

/// Structured verification report.
///
/// `overall_ok` is `chain_ok && (no proofs || merkle_ok) && policy_ok`:
/// a bundle without proofs can still verify on chain contiguity alone, but
/// supplied proofs must all hold.
#[derive(Debug, Clone, Serialize)]
pub struct BundleVerification {
    pub bundle_id: String,
    #[serde(with = "ts_millis")]
    pub verified_at: DateTime<Utc>,
    pub chain_ok: bool,
    pub merkle_ok: bool,
    pub policy_ok: bool,
    pub overall_ok: bool,
    pub errors: Vec<VerificationFailure>,
}

/// Verifies a bundle with no trusted state beyond the bundle itself.
///
/// Equivalent to `BundleVerifier::new().verify(bundle)`.
pub fn verify_bundle(bundle: &ComplianceProofBundle) -> BundleVerification {
    BundleVerifier::new().verify(bundle)
}

/// The reference verifier.
///
/// By default the verifier is fully offline and self-contained. When the
/// auditor holds trusted sealed roots (obtained out of band, e.g. from an
/// anchoring backend), [`with_known_roots`](Self::with_known_roots) enables
/// the stronger cross-check: a proof whose root is unknown is reported as a
/// bundle inconsistency even if it replays correctly.
#[derive(Debug, Default)]
pub struct BundleVerifier {
    known_roots: Option<HashSet<String>>,
}

impl BundleVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the sealed-root cross-check against a trusted root set.
    #[must_use]
    pub fn with_known_roots<I>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.known_roots = Some(roots.into_iter().collect());
        self
    }

    /// Runs every verification dimension and reports the findings.
    pub fn verify(&self, bundle: &ComplianceProofBundle) -> BundleVerification {
        let mut errors = Vec::new();

        let chain_ok = self.verify_chain(bundle, &mut errors);
        let merkle_ok = self.verify_proofs(bundle, &mut errors);
        let policy_ok = self.verify_commitments(bundle, &mut errors);

        let overall_ok =
            chain_ok && (bundle.merkle_proofs.is_empty() || merkle_ok) && policy_ok;

        BundleVerification {
            bundle_id: bundle.bundle_id.clone(),
            verified_at: Utc::now(),
            chain_ok,
            merkle_ok,
            policy_ok,
            overall_ok,
            errors,
        }
    }

    /// Recomputes every record hash and rechecks contiguity inside the
    /// bundle. Non-contiguous ledger slices fail here; they must carry
    /// Merkle proofs instead.
    fn verify_chain(
        &self,
        bundle: &ComplianceProofBundle,
        errors: &mut Vec<VerificationFailure>,
    ) -> bool {
        let mut ok = true;
        for (i, record) in bundle.records.iter().enumerate() {
            let expected = record.compute_hash();
            if record.record_hash.as_deref() != Some(expected.as_str()) {
                ok = false;
                errors.push(VerificationFailure::RecordHashMismatch {
                    record_id: record.record_id.clone(),
                });
            }

            if i > 0 && record.previous_hash != bundle.records[i - 1].record_hash {
                ok = false;
                errors.push(VerificationFailure::ChainBroken {
                    record_id: record.record_id.clone(),
                });
            }
        }
        ok
    }

    fn verify_proofs(
        &self,
        bundle: &ComplianceProofBundle,
        errors: &mut Vec<VerificationFailure>,
    ) -> bool {
        let mut ok = true;
        for proof in &bundle.merkle_proofs {
            if !proof.verify() {
                ok = false;
                errors.push(VerificationFailure::ProofInvalid {
                    leaf_hash: proof.leaf_hash.clone(),
                });
            }

            if let Some(known_roots) = &self.known_roots {
                if !known_roots.contains(&proof.root_hash) {
                    ok = false;
                    errors.push(VerificationFailure::Inconsistent {
                        detail: format!(
                            "proof root {} is not a sealed root known to the verifier",
                            proof.root_hash
                        ),
                    });
                }
            }
        }
        ok
    }

    fn verify_commitments(
        &self,
        bundle: &ComplianceProofBundle,
        errors: &mut Vec<VerificationFailure>,
    ) -> bool {
        let mut ok = true;
        for (key, commitment) in &bundle.policy_commitments {
            if !is_hex_digest(commitment) {
                ok = false;
                errors.push(VerificationFailure::CommitmentMalformed { key: key.clone() });
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleType;
    use auditseal_ledger::AuditRecord;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn chained_records(n: usize) -> Vec<AuditRecord> {
        let mut records = Vec::new();
        let mut previous = auditseal_canonical::GENESIS_HASH.to_string();
        for i in 0..n {
            let mut record = AuditRecord::new(
                format!("rec-{i}"),
                format!("evt-{i}"),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, i as u32).unwrap(),
                "object.create",
                "tenant-1",
                "b",
            );
            record.previous_hash = Some(previous.clone());
            let hash = record.compute_hash();
            record.record_hash = Some(hash.clone());
            previous = hash;
            records.push(record);
        }
        records
    }

    fn bundle_of(records: Vec<AuditRecord>) -> ComplianceProofBundle {
        ComplianceProofBundle {
            bundle_id: "bundle-test".to_string(),
            bundle_type: BundleType::BatchRecords,
            created_at: Utc::now(),
            records,
            policy_commitments: BTreeMap::new(),
            merkle_proofs: Vec::new(),
            anchoring_refs: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn contiguous_chain_verifies() {
        let report = verify_bundle(&bundle_of(chained_records(4)));
        assert!(report.chain_ok);
        assert!(report.merkle_ok);
        assert!(report.policy_ok);
        assert!(report.overall_ok);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn empty_bundle_verifies_trivially() {
        let report = verify_bundle(&bundle_of(Vec::new()));
        assert!(report.overall_ok);
    }

    #[test]
    fn tampered_record_is_reported() {
        let mut records = chained_records(3);
        records[1].event_type = "object.delete".to_string();

        let report = verify_bundle(&bundle_of(records));
        assert!(!report.chain_ok);
        assert!(!report.overall_ok);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, VerificationFailure::RecordHashMismatch { record_id } if record_id == "rec-1")));
    }

    #[test]
    fn non_contiguous_slice_fails_chain() {
        let mut records = chained_records(4);
        records.remove(1);

        let report = verify_bundle(&bundle_of(records));
        assert!(!report.chain_ok);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, VerificationFailure::ChainBroken { record_id } if record_id == "rec-2")));
    }

    #[test]
    fn malformed_commitment_is_reported() {
        let mut bundle = bundle_of(chained_records(1));
        bundle
            .policy_commitments
            .insert("rec-0".to_string(), "not-a-digest".to_string());

        let report = verify_bundle(&bundle);
        assert!(report.chain_ok);
        assert!(!report.policy_ok);
        assert!(!report.overall_ok);
    }

    #[test]
    fn unknown_proof_root_fails_cross_check() {
        use auditseal_ledger::MerkleTree;

        let records = chained_records(2);
        let leaves: Vec<String> = records
            .iter()
            .map(|r| r.record_hash.clone().unwrap())
            .collect();
        let tree = MerkleTree::new(leaves);
        let proof = tree.proof_for_index(0).unwrap();

        let mut bundle = bundle_of(records);
        bundle.merkle_proofs.push(proof);

        // Replay succeeds with no trusted state.
        assert!(verify_bundle(&bundle).overall_ok);

        // With a trusted root set that does not contain this root, the
        // cross-check rejects it.
        let strict = BundleVerifier::new().with_known_roots(["f".repeat(64)]);
        let report = strict.verify(&bundle);
        assert!(!report.merkle_ok);
        assert!(!report.overall_ok);

        // And accepts it when the root is trusted.
        let trusting = BundleVerifier::new().with_known_roots([tree.root().to_string()]);
        assert!(trusting.verify(&bundle).overall_ok);
    }

    #[test]
    fn failure_messages_name_the_defect() {
        let failure = VerificationFailure::ChainBroken {
            record_id: "rec-9".to_string(),
        };
        assert_eq!(failure.to_string(), "chain break at record rec-9");
    }
}
