//! Compliance events emitted by the storage control plane.

use auditseal_canonical::{format_ts, hash_value, ts_millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

/// The kinds of mutation the control plane reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "object.create")]
    ObjectCreate,
    #[serde(rename = "object.update")]
    ObjectUpdate,
    #[serde(rename = "object.delete")]
    ObjectDelete,
    #[serde(rename = "object.read")]
    ObjectRead,
    #[serde(rename = "policy.create")]
    PolicyCreate,
    #[serde(rename = "policy.update")]
    PolicyUpdate,
    #[serde(rename = "policy.delete")]
    PolicyDelete,
}

impl EventType {
    /// The dotted wire name carried into audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ObjectCreate => "object.create",
            EventType::ObjectUpdate => "object.update",
            EventType::ObjectDelete => "object.delete",
            EventType::ObjectRead => "object.read",
            EventType::PolicyCreate => "policy.create",
            EventType::PolicyUpdate => "policy.update",
            EventType::PolicyDelete => "policy.delete",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event describing one mutation (or read) of an object, bucket or
/// policy. Immutable after construction; events are consumed by the pipeline
/// and discarded, only the derived record persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEvent {
    pub event_id: String,
    pub event_type: EventType,
    #[serde(with = "ts_millis")]
    pub timestamp: DateTime<Utc>,
    pub tenant_id: String,
    pub bucket: String,
    pub object_key: Option<String>,
    pub principal: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ComplianceEvent {
    pub fn new(
        event_id: impl Into<String>,
        event_type: EventType,
        timestamp: DateTime<Utc>,
        tenant_id: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type,
            timestamp,
            tenant_id: tenant_id.into(),
            bucket: bucket.into(),
            object_key: None,
            principal: None,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_object_key(mut self, object_key: impl Into<String>) -> Self {
        self.object_key = Some(object_key.into());
        self
    }

    #[must_use]
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
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

    /// Content digest of the event for producer-side spot checks.
    ///
    /// Events are not tamper-protected; this digest only lets a producer
    /// confirm the interceptor saw the bytes it sent.
    pub fn content_hash(&self) -> String {
        let pre_image = json!({
            "event_id": self.event_id,
            "event_type": self.event_type.as_str(),
            "timestamp": format_ts(&self.timestamp),
            "tenant_id": self.tenant_id,
            "bucket": self.bucket,
            "object_key": self.object_key,
            "principal": self.principal,
            "metadata": self.metadata,
        });
        hash_value(&pre_image)
    }
}
