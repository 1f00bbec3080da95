//! The proof bundle wire type.

use crate::anchor::AnchoringReference;
use auditseal_canonical::ts_millis;
use auditseal_ledger::{AuditRecord, MerkleProof};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminator for how a bundle's records were selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleType {
    #[serde(rename = "single_record")]
    SingleRecord,
    #[serde(rename = "batch_records")]
    BatchRecords,
    #[serde(rename = "time_range")]
    TimeRange,
    #[serde(rename = "tenant_scope")]
    TenantScope,
}

/// A self-contained, serializable compliance proof bundle.
///
/// `records` are in ledger order. `policy_commitments` maps record id (or
/// the literal key `"policy"` for single-record bundles) to the commitment
/// digest the record binds. `merkle_proofs` carries one proof per record
/// whose batch was sealed at build time. Bundles are ephemeral views: they
/// are materialized on demand and never stored by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceProofBundle {
    pub bundle_id: String,
    pub bundle_type: BundleType,
    #[serde(with = "ts_millis")]
    pub created_at: DateTime<Utc>,
    pub records: Vec<AuditRecord>,
    #[serde(default)]
    pub policy_commitments: BTreeMap<String, String>,
    #[serde(default)]
    pub merkle_proofs: Vec<MerkleProof>,
    #[serde(default)]
    pub anchoring_refs: Vec<AnchoringReference>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ComplianceProofBundle {
    /// Pretty-printed JSON for handing to an auditor.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn has_merkle_proofs(&self) -> bool {
        !self.merkle_proofs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_type_discriminators() {
        assert_eq!(
            serde_json::to_string(&BundleType::SingleRecord).unwrap(),
            r#""single_record""#
        );
        assert_eq!(
            serde_json::to_string(&BundleType::BatchRecords).unwrap(),
            r#""batch_records""#
        );
        assert_eq!(
            serde_json::to_string(&BundleType::TimeRange).unwrap(),
            r#""time_range""#
        );
        assert_eq!(
            serde_json::to_string(&BundleType::TenantScope).unwrap(),
            r#""tenant_scope""#
        );
    }

    #[test]
    fn empty_bundle_serializes_and_parses() {
        let bundle = ComplianceProofBundle {
            bundle_id: "bundle-x".to_string(),
            bundle_type: BundleType::TenantScope,
            created_at: Utc::now(),
            records: Vec::new(),
            policy_commitments: BTreeMap::new(),
            merkle_proofs: Vec::new(),
            anchoring_refs: Vec::new(),
            metadata: BTreeMap::new(),
        };

        let json = bundle.to_json().unwrap();
        let back: ComplianceProofBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
        assert!(!back.has_merkle_proofs());
    }
}
