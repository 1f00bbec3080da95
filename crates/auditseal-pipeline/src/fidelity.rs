//! Fidelity levels and the selection configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Evidentiary strength of an audit record, in increasing order.
///
/// The derived ordering follows evidentiary strength, so
/// `AuditFidelity::Chained < AuditFidelity::MerkleProof` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuditFidelity {
    /// Minimal envelope; the record is chained but carries no event payload.
    MetadataOnly,
    /// Full event metadata, hash-chained.
    Chained,
    /// Additionally bound to a policy commitment digest.
    PolicyBound,
    /// Policy-bound, plus a hint for bundle builders to attach inclusion
    /// proofs.
    MerkleProof,
}

impl AuditFidelity {
    /// The snake_case wire tag stored in record metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditFidelity::MetadataOnly => "metadata_only",
            AuditFidelity::Chained => "chained",
            AuditFidelity::PolicyBound => "policy_bound",
            AuditFidelity::MerkleProof => "merkle_proof",
        }
    }
}

/// Criticality supplied by the caller alongside an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCriticality {
    Low,
    Medium,
    High,
    Critical,
}

/// The pipeline's selection table.
///
/// `bucket_configs` is keyed by the composite `"<tenant_id>/<bucket>"` form
/// produced by [`AuditConfig::bucket_key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub default_fidelity: AuditFidelity,
    pub tenant_configs: HashMap<String, AuditFidelity>,
    pub bucket_configs: HashMap<String, AuditFidelity>,
    pub criticality_configs: HashMap<PolicyCriticality, AuditFidelity>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        let criticality_configs = HashMap::from([
            (PolicyCriticality::Low, AuditFidelity::MetadataOnly),
            (PolicyCriticality::Medium, AuditFidelity::Chained),
            (PolicyCriticality::High, AuditFidelity::PolicyBound),
            (PolicyCriticality::Critical, AuditFidelity::MerkleProof),
        ]);

        Self {
            default_fidelity: AuditFidelity::Chained,
            tenant_configs: HashMap::new(),
            bucket_configs: HashMap::new(),
            criticality_configs,
        }
    }
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite key for bucket-level entries.
    pub fn bucket_key(tenant_id: &str, bucket: &str) -> String {
        format!("{tenant_id}/{bucket}")
    }

    /// Selects the fidelity for an event.
    ///
    /// Precedence is fixed: tenant entry, then `(tenant, bucket)` entry,
    /// then criticality entry, then the default. A tenant entry is a hard
    /// override that ignores bucket configuration for that tenant.
    pub fn get_fidelity(
        &self,
        tenant_id: &str,
        bucket: &str,
        criticality: Option<PolicyCriticality>,
    ) -> AuditFidelity {
        if let Some(&fidelity) = self.tenant_configs.get(tenant_id) {
            return fidelity;
        }

        if let Some(&fidelity) = self.bucket_configs.get(&Self::bucket_key(tenant_id, bucket)) {
            return fidelity;
        }

        if let Some(criticality) = criticality {
            if let Some(&fidelity) = self.criticality_configs.get(&criticality) {
                return fidelity;
            }
        }

        self.default_fidelity
    }

    pub fn set_tenant_fidelity(&mut self, tenant_id: impl Into<String>, fidelity: AuditFidelity) {
        self.tenant_configs.insert(tenant_id.into(), fidelity);
    }

    pub fn set_bucket_fidelity(
        &mut self,
        tenant_id: &str,
        bucket: &str,
        fidelity: AuditFidelity,
    ) {
        self.bucket_configs
            .insert(Self::bucket_key(tenant_id, bucket), fidelity);
    }

    pub fn set_criticality_fidelity(
        &mut self,
        criticality: PolicyCriticality,
        fidelity: AuditFidelity,
    ) {
        self.criticality_configs.insert(criticality, fidelity);
    }
}
