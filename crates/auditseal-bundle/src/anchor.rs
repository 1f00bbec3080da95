//! External anchoring references.
//!
//! An anchor is a pointer to an external trust root that witnessed a ledger
//! root at some time. The backends themselves (a blockchain transaction, an
//! RFC 3161 timestamp authority, a notary service) are opaque to this crate;
//! only the reference travels inside bundles.

use auditseal_canonical::ts_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of external trust root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    Blockchain,
    TimestampService,
    Notary,
}

/// A witness record from an external anchoring backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchoringReference {
    pub anchor_type: AnchorType,
    /// Backend-specific identifier (transaction id, TSA serial, ...).
    pub anchor_id: String,
    #[serde(with = "ts_millis")]
    pub anchor_time: DateTime<Utc>,
    /// The digest the backend witnessed, typically a sealed Merkle root.
    pub anchor_hash: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl AnchoringReference {
    pub fn new(
        anchor_type: AnchorType,
        anchor_id: impl Into<String>,
        anchor_time: DateTime<Utc>,
        anchor_hash: impl Into<String>,
    ) -> Self {
        Self {
            anchor_type,
            anchor_id: anchor_id.into(),
            anchor_time,
            anchor_hash: anchor_hash.into(),
            metadata: BTreeMap::new(),
        }
    }
}
