//! The audit record and its hash computation.

use auditseal_canonical::{format_ts, hash_value, ts_millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// A single tamper-evident audit record.
///
/// Records are created by the pipeline, chained by the ledger, and never
/// mutated afterwards. `previous_hash` and `record_hash` are `None` until
/// the ledger appends the record; on the wire (bundle serialization) absent
/// optionals appear as JSON `null`.
///
/// # Hash computation
///
/// `record_hash` is the SHA-256 digest of the canonical encoding of every
/// field except `record_hash` itself, with the timestamp rendered as
/// RFC-3339 UTC at millisecond precision. Since `previous_hash` is part of
/// the pre-image, editing any historical record breaks every later link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub record_id: String,
    pub event_id: String,
    #[serde(with = "ts_millis")]
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub tenant_id: String,
    pub bucket: String,
    pub object_key: Option<String>,
    pub policy_commitment: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub previous_hash: Option<String>,
    pub record_hash: Option<String>,
}

impl AuditRecord {
    /// Creates an unchained record. The ledger fills `previous_hash` and
    /// `record_hash` during append.
    pub fn new(
        record_id: impl Into<String>,
        event_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        event_type: impl Into<String>,
        tenant_id: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            event_id: event_id.into(),
            timestamp,
            event_type: event_type.into(),
            tenant_id: tenant_id.into(),
            bucket: bucket.into(),
            object_key: None,
            policy_commitment: None,
            metadata: BTreeMap::new(),
            previous_hash: None,
            record_hash: None,
        }
    }

    #[must_use]
    pub fn with_object_key(mut self, object_key: impl Into<String>) -> Self {
        self.object_key = Some(object_key.into());
        self
    }

    #[must_use]
    pub fn with_policy_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.policy_commitment = Some(commitment.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_metadata_entry(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Computes the record's content hash from its current field values.
    ///
    /// Used both when appending (to set `record_hash`) and when verifying
    /// (to detect drift between stored fields and the stored hash).
    pub fn compute_hash(&self) -> String {
        let pre_image = json!({
            "record_id": self.record_id,
            "event_id": self.event_id,
            "timestamp": format_ts(&self.timestamp),
            "event_type": self.event_type,
            "tenant_id": self.tenant_id,
            "bucket": self.bucket,
            "object_key": self.object_key,
            "policy_commitment": self.policy_commitment,
            "metadata": self.metadata,
            "previous_hash": self.previous_hash,
        });
        hash_value(&pre_image)
    }
}
