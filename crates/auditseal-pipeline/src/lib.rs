//! # AuditSeal Adaptive Audit Pipeline
//!
//! Routes compliance events into ledger records at the correct evidentiary
//! level. For each incoming event the pipeline selects a fidelity from
//! configuration, synthesizes the matching record shape, appends it to the
//! ledger under the single writer lock, and notifies registered observers.
//!
//! ## Fidelity levels
//!
//! In increasing evidentiary strength:
//!
//! | Level | Record contents |
//! |-------|-----------------|
//! | `metadata_only` | Minimal envelope; chained, but event payload omitted |
//! | `chained` | Full event metadata |
//! | `policy_bound` | Plus the policy commitment digest (or an `unbound` tag) |
//! | `merkle_proof` | Plus a hint that bundles should attach inclusion proofs |
//!
//! Every record is chained regardless of level; the ledger always chains.
//!
//! ## Selection precedence
//!
//! Tenant rule, then `(tenant, bucket)` rule, then criticality, then the
//! configured default. The tenant rule is a hard override: configuring a
//! tenant ignores bucket-level entries for that tenant. Auditors reason
//! about this ordering, so it is part of the contract, not an
//! implementation detail.
//!
//! ## Example
//!
//! ```rust
//! use auditseal_intercept::{ComplianceEvent, EventType};
//! use auditseal_ledger::AuditLedger;
//! use auditseal_pipeline::{AdaptiveAuditPipeline, AuditFidelity};
//! use chrono::Utc;
//! use parking_lot::RwLock;
//! use std::sync::Arc;
//!
//! let ledger = Arc::new(RwLock::new(AuditLedger::new()));
//! let pipeline = AdaptiveAuditPipeline::new(Arc::clone(&ledger));
//!
//! let event = ComplianceEvent::new(
//!     "evt-1",
//!     EventType::ObjectCreate,
//!     Utc::now(),
//!     "tenant-1",
//!     "bucket-a",
//! );
//!
//! let processed = pipeline.process_event(event, None, None).unwrap();
//! assert_eq!(processed.fidelity, AuditFidelity::Chained);
//! assert!(ledger.read().verify_chain_integrity());
//! ```

pub mod error;
pub mod fidelity;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use fidelity::{AuditConfig, AuditFidelity, PolicyCriticality};
pub use pipeline::{
    AdaptiveAuditPipeline, PipelineStats, ProcessedAuditEvent, DEFAULT_HISTORY_CAPACITY,
};
