//! Bundle assembly against a live ledger.

use crate::anchor::AnchoringReference;
use crate::bundle::{BundleType, ComplianceProofBundle};
use auditseal_ledger::{AuditLedger, AuditRecord, MerkleProof};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Builds proof bundles from the ledger and the registered anchors.
///
/// The builder only reads: it takes the ledger's read guard per bundle, so
/// assembly can run concurrently with other readers while the writer lock
/// serializes it against appends.
pub struct BundleBuilder {
    ledger: Arc<RwLock<AuditLedger>>,
    anchors: RwLock<Vec<AnchoringReference>>,
}

impl BundleBuilder {
    pub fn new(ledger: Arc<RwLock<AuditLedger>>) -> Self {
        Self {
            ledger,
            anchors: RwLock::new(Vec::new()),
        }
    }

    /// Registers an external anchoring reference for inclusion in future
    /// bundles whose time span covers it.
    pub fn add_anchor(&self, anchor: AnchoringReference) {
        self.anchors.write().push(anchor);
    }

    /// Bundle for exactly one record. `None` when the id is unknown.
    ///
    /// The commitment map uses the literal key `"policy"` for this variant.
    /// An inclusion proof is attached when requested and the record's batch
    /// is sealed.
    pub fn single_record(
        &self,
        record_id: &str,
        include_proof: bool,
    ) -> Option<ComplianceProofBundle> {
        let ledger = self.ledger.read();
        let record = ledger.get_record(record_id)?.clone();

        let mut policy_commitments = BTreeMap::new();
        if let Some(commitment) = &record.policy_commitment {
            policy_commitments.insert("policy".to_string(), commitment.clone());
        }

        let merkle_proofs = if include_proof {
            self.proofs_for(&ledger, std::slice::from_ref(&record))
        } else {
            Vec::new()
        };

        let records = vec![record];
        let metadata = BTreeMap::from([
            ("record_count".to_string(), json!(1)),
            ("has_merkle_proof".to_string(), json!(!merkle_proofs.is_empty())),
        ]);

        Some(self.assemble(
            format!("bundle-{record_id}"),
            BundleType::SingleRecord,
            records,
            policy_commitments,
            merkle_proofs,
            metadata,
        ))
    }

    /// Bundle for a caller-supplied id list, in ledger order. Ids the ledger
    /// does not know are silently skipped; `None` when none were found.
    pub fn batch(
        &self,
        record_ids: &[String],
        include_proofs: bool,
    ) -> Option<ComplianceProofBundle> {
        let ledger = self.ledger.read();

        let mut records: Vec<AuditRecord> = record_ids
            .iter()
            .filter_map(|id| ledger.get_record(id).cloned())
            .collect();
        if records.is_empty() {
            return None;
        }
        // Ledger order, whatever order the caller asked in.
        records.sort_by_key(|record| ledger.position_of(&record.record_id));

        let requested = record_ids.len();
        let policy_commitments = commitments_by_record(&records);
        let merkle_proofs = if include_proofs {
            self.proofs_for(&ledger, &records)
        } else {
            Vec::new()
        };

        let metadata = BTreeMap::from([
            ("record_count".to_string(), json!(records.len())),
            ("requested_count".to_string(), json!(requested)),
            ("has_merkle_proofs".to_string(), json!(!merkle_proofs.is_empty())),
        ]);

        Some(self.assemble(
            format!("bundle-batch-{}", Uuid::new_v4()),
            BundleType::BatchRecords,
            records,
            policy_commitments,
            merkle_proofs,
            metadata,
        ))
    }

    /// Bundle for every record with `start <= timestamp <= end`, optionally
    /// restricted to one tenant. The selection may be empty; an auditor can
    /// legitimately ask about a quiet window.
    pub fn time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tenant_id: Option<&str>,
        include_proofs: bool,
    ) -> ComplianceProofBundle {
        let ledger = self.ledger.read();

        let records: Vec<AuditRecord> = ledger
            .records()
            .iter()
            .filter(|record| record.timestamp >= start && record.timestamp <= end)
            .filter(|record| tenant_id.is_none_or(|tenant| record.tenant_id == tenant))
            .cloned()
            .collect();

        let policy_commitments = commitments_by_record(&records);
        let merkle_proofs = if include_proofs {
            self.proofs_for(&ledger, &records)
        } else {
            Vec::new()
        };

        let metadata = BTreeMap::from([
            ("record_count".to_string(), json!(records.len())),
            ("start_time".to_string(), json!(auditseal_canonical::format_ts(&start))),
            ("end_time".to_string(), json!(auditseal_canonical::format_ts(&end))),
            ("tenant_id".to_string(), json!(tenant_id)),
            ("has_merkle_proofs".to_string(), json!(!merkle_proofs.is_empty())),
        ]);

        self.assemble(
            format!("bundle-timerange-{}", Uuid::new_v4()),
            BundleType::TimeRange,
            records,
            policy_commitments,
            merkle_proofs,
            metadata,
        )
    }

    /// Bundle for every record of one tenant.
    pub fn tenant_scope(&self, tenant_id: &str, include_proofs: bool) -> ComplianceProofBundle {
        let ledger = self.ledger.read();

        let records: Vec<AuditRecord> = ledger
            .records()
            .iter()
            .filter(|record| record.tenant_id == tenant_id)
            .cloned()
            .collect();

        let policy_commitments = commitments_by_record(&records);
        let merkle_proofs = if include_proofs {
            self.proofs_for(&ledger, &records)
        } else {
            Vec::new()
        };

        let metadata = BTreeMap::from([
            ("record_count".to_string(), json!(records.len())),
            ("tenant_id".to_string(), json!(tenant_id)),
            ("has_merkle_proofs".to_string(), json!(!merkle_proofs.is_empty())),
        ]);

        self.assemble(
            format!("bundle-tenant-{tenant_id}"),
            BundleType::TenantScope,
            records,
            policy_commitments,
            merkle_proofs,
            metadata,
        )
    }

    /// Proofs for every record whose batch is sealed; open-batch records
    /// simply contribute none.
    fn proofs_for(&self, ledger: &AuditLedger, records: &[AuditRecord]) -> Vec<MerkleProof> {
        records
            .iter()
            .filter_map(|record| ledger.generate_inclusion_proof(&record.record_id).ok())
            .collect()
    }

    fn assemble(
        &self,
        bundle_id: String,
        bundle_type: BundleType,
        records: Vec<AuditRecord>,
        policy_commitments: BTreeMap<String, String>,
        merkle_proofs: Vec<MerkleProof>,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> ComplianceProofBundle {
        debug!(
            bundle_id = %bundle_id,
            records = records.len(),
            proofs = merkle_proofs.len(),
            "assembled proof bundle"
        );
        ComplianceProofBundle {
            bundle_id,
            bundle_type,
            created_at: Utc::now(),
            anchoring_refs: self.relevant_anchors(&records),
            records,
            policy_commitments,
            merkle_proofs,
            metadata,
        }
    }

    /// Anchors whose `anchor_time` falls inside the records' timestamp span.
    fn relevant_anchors(&self, records: &[AuditRecord]) -> Vec<AnchoringReference> {
        let Some(min) = records.iter().map(|r| r.timestamp).min() else {
            return Vec::new();
        };
        let max = records
            .iter()
            .map(|r| r.timestamp)
            .max()
            .unwrap_or(min);

        self.anchors
            .read()
            .iter()
            .filter(|anchor| anchor.anchor_time >= min && anchor.anchor_time <= max)
            .cloned()
            .collect()
    }
}

fn commitments_by_record(records: &[AuditRecord]) -> BTreeMap<String, String> {
    records
        .iter()
        .filter_map(|record| {
            record
                .policy_commitment
                .as_ref()
                .map(|commitment| (record.record_id.clone(), commitment.clone()))
        })
        .collect()
}
