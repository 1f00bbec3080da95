//! The adaptive pipeline: event in, chained record out.

use crate::error::Result;
use crate::fidelity::{AuditConfig, AuditFidelity, PolicyCriticality};
use auditseal_canonical::ts_millis;
use auditseal_intercept::{ComplianceEvent, EventInterceptor};
use auditseal_ledger::{AuditLedger, AuditRecord};
use auditseal_policy::CanonicalPolicy;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Processed-event history retained for diagnostics unless configured
/// otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Callback invoked after each processed event.
pub type PipelineObserver = Arc<dyn Fn(&ProcessedAuditEvent) -> anyhow::Result<()> + Send + Sync>;

/// The outcome of routing one event: the event, the fidelity chosen for it,
/// the chained record as appended, and the commitment used, if any.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedAuditEvent {
    pub event: ComplianceEvent,
    pub fidelity: AuditFidelity,
    pub record: AuditRecord,
    pub policy_commitment: Option<String>,
    #[serde(with = "ts_millis")]
    pub processed_at: DateTime<Utc>,
}

/// Snapshot of pipeline counters.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub total_processed: u64,
    pub fidelity_distribution: HashMap<String, u64>,
    pub ledger_record_count: usize,
}

/// Adaptive multi-fidelity audit pipeline.
///
/// The pipeline is the single logical writer of its ledger: `process_event`
/// takes the write guard for the append, and everything else reads. The
/// processed-event history is diagnostic state with a bounded retention; it
/// is not part of the audit trail.
pub struct AdaptiveAuditPipeline {
    ledger: Arc<RwLock<AuditLedger>>,
    config: RwLock<AuditConfig>,
    observers: RwLock<Vec<PipelineObserver>>,
    recent: Mutex<VecDeque<ProcessedAuditEvent>>,
    history_capacity: usize,
    total_processed: AtomicU64,
    fidelity_counts: Mutex<HashMap<AuditFidelity, u64>>,
    observer_failures: AtomicU64,
}

impl AdaptiveAuditPipeline {
    /// Creates a pipeline over a shared ledger with default configuration.
    pub fn new(ledger: Arc<RwLock<AuditLedger>>) -> Self {
        Self::with_config(ledger, AuditConfig::default())
    }

    /// Creates a pipeline with an explicit configuration.
    pub fn with_config(ledger: Arc<RwLock<AuditLedger>>, config: AuditConfig) -> Self {
        Self {
            ledger,
            config: RwLock::new(config),
            observers: RwLock::new(Vec::new()),
            recent: Mutex::new(VecDeque::new()),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            total_processed: AtomicU64::new(0),
            fidelity_counts: Mutex::new(HashMap::new()),
            observer_failures: AtomicU64::new(0),
        }
    }

    /// Overrides the diagnostic history retention.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Shared handle to the underlying ledger.
    pub fn ledger(&self) -> Arc<RwLock<AuditLedger>> {
        Arc::clone(&self.ledger)
    }

    /// Registers an observer for processed events. Failures are logged and
    /// counted, never propagated.
    pub fn register_observer<F>(&self, observer: F)
    where
        F: Fn(&ProcessedAuditEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observers.write().push(Arc::new(observer));
    }

    /// Replaces the entire selection configuration.
    pub fn update_config(&self, config: AuditConfig) {
        *self.config.write() = config;
    }

    /// Hard override: this tenant's events use `fidelity` regardless of
    /// bucket or criticality configuration.
    pub fn set_tenant_fidelity(&self, tenant_id: impl Into<String>, fidelity: AuditFidelity) {
        self.config.write().set_tenant_fidelity(tenant_id, fidelity);
    }

    pub fn set_bucket_fidelity(&self, tenant_id: &str, bucket: &str, fidelity: AuditFidelity) {
        self.config
            .write()
            .set_bucket_fidelity(tenant_id, bucket, fidelity);
    }

    /// Resolves the fidelity an event on this tenant/bucket would get.
    pub fn get_fidelity(
        &self,
        tenant_id: &str,
        bucket: &str,
        criticality: Option<PolicyCriticality>,
    ) -> AuditFidelity {
        self.config.read().get_fidelity(tenant_id, bucket, criticality)
    }

    /// Routes one event: selects fidelity, synthesizes the record, appends
    /// it under the writer lock, and notifies observers.
    ///
    /// A `policy` is consulted only at `policy_bound` and `merkle_proof`
    /// fidelity. At those levels, a missing policy does not fail the append;
    /// the record is tagged `unbound` instead.
    pub fn process_event(
        &self,
        event: ComplianceEvent,
        policy: Option<&CanonicalPolicy>,
        criticality: Option<PolicyCriticality>,
    ) -> Result<ProcessedAuditEvent> {
        let fidelity = self
            .config
            .read()
            .get_fidelity(&event.tenant_id, &event.bucket, criticality);

        let policy_commitment = match fidelity {
            AuditFidelity::PolicyBound | AuditFidelity::MerkleProof => {
                policy.map(|p| p.commitment_hash.clone())
            }
            _ => None,
        };

        let record = build_record(&event, fidelity, policy_commitment.as_deref());

        let chained = {
            let mut ledger = self.ledger.write();
            ledger.append(record)?;
            ledger
                .latest_record()
                .cloned()
                .expect("append just inserted a record")
        };

        debug!(
            event_id = %event.event_id,
            record_id = %chained.record_id,
            fidelity = fidelity.as_str(),
            "processed event"
        );

        let processed = ProcessedAuditEvent {
            event,
            fidelity,
            record: chained,
            policy_commitment,
            processed_at: Utc::now(),
        };

        self.total_processed.fetch_add(1, Ordering::Relaxed);
        *self.fidelity_counts.lock().entry(fidelity).or_insert(0) += 1;

        {
            let mut recent = self.recent.lock();
            if self.history_capacity == 0 {
                recent.clear();
            } else {
                while recent.len() >= self.history_capacity {
                    recent.pop_front();
                }
                recent.push_back(processed.clone());
            }
        }

        let observers: Vec<PipelineObserver> = self.observers.read().clone();
        for observer in observers {
            if let Err(error) = observer(&processed) {
                self.observer_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    record_id = %processed.record.record_id,
                    %error,
                    "pipeline observer failed"
                );
            }
        }

        Ok(processed)
    }

    /// Drains one event from an interceptor and processes it without policy
    /// binding. The CEI to AAP consumer loop is this call repeated.
    pub fn drain_one(
        &self,
        interceptor: &EventInterceptor,
        timeout: Option<Duration>,
    ) -> Option<Result<ProcessedAuditEvent>> {
        let event = interceptor.get_event(timeout)?;
        Some(self.process_event(event, None, None))
    }

    /// Snapshot of the processing counters.
    pub fn stats(&self) -> PipelineStats {
        let fidelity_distribution = self
            .fidelity_counts
            .lock()
            .iter()
            .map(|(fidelity, count)| (fidelity.as_str().to_string(), *count))
            .collect();

        PipelineStats {
            total_processed: self.total_processed.load(Ordering::Relaxed),
            fidelity_distribution,
            ledger_record_count: self.ledger.read().record_count(),
        }
    }

    /// The retained processed-event history, oldest first.
    pub fn recent_events(&self) -> Vec<ProcessedAuditEvent> {
        self.recent.lock().iter().cloned().collect()
    }

    /// Observer invocations that returned an error.
    pub fn observer_failure_count(&self) -> u64 {
        self.observer_failures.load(Ordering::Relaxed)
    }
}

/// Synthesizes the record shape for a fidelity level.
fn build_record(
    event: &ComplianceEvent,
    fidelity: AuditFidelity,
    policy_commitment: Option<&str>,
) -> AuditRecord {
    let mut metadata = BTreeMap::new();
    metadata.insert("fidelity".to_string(), json!(fidelity.as_str()));
    metadata.insert("principal".to_string(), json!(event.principal));

    if fidelity >= AuditFidelity::Chained {
        metadata.insert("event_metadata".to_string(), json!(event.metadata));
    }

    if matches!(
        fidelity,
        AuditFidelity::PolicyBound | AuditFidelity::MerkleProof
    ) && policy_commitment.is_none()
    {
        metadata.insert("unbound".to_string(), json!(true));
    }

    if fidelity == AuditFidelity::MerkleProof {
        metadata.insert("supports_merkle_proof".to_string(), json!(true));
    }

    let mut record = AuditRecord::new(
        Uuid::new_v4().to_string(),
        event.event_id.clone(),
        event.timestamp,
        event.event_type.as_str(),
        event.tenant_id.clone(),
        event.bucket.clone(),
    )
    .with_metadata(metadata);

    if let Some(object_key) = &event.object_key {
        record = record.with_object_key(object_key.clone());
    }
    if let Some(commitment) = policy_commitment {
        record = record.with_policy_commitment(commitment);
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditseal_intercept::EventType;
    use auditseal_policy::{Policy, PolicyAction, PolicyCompiler, PolicyEffect, PolicyStatement};

    fn pipeline() -> AdaptiveAuditPipeline {
        AdaptiveAuditPipeline::new(Arc::new(RwLock::new(AuditLedger::new())))
    }

    fn event(tenant: &str, bucket: &str) -> ComplianceEvent {
        ComplianceEvent::new("evt-1", EventType::ObjectCreate, Utc::now(), tenant, bucket)
            .with_principal("alice")
            .with_metadata_entry("size", json!(2048))
    }

    fn canonical_policy() -> CanonicalPolicy {
        let mut compiler = PolicyCompiler::new();
        compiler
            .compile(&Policy::new("pol-1", "1.0", "n").with_statement(PolicyStatement::new(
                "s",
                PolicyEffect::Allow,
                vec![PolicyAction::Read],
                vec!["r".to_string()],
            )))
            .unwrap()
    }

    #[test]
    fn default_fidelity_records_full_metadata() {
        let pipeline = pipeline();
        let processed = pipeline.process_event(event("t", "b"), None, None).unwrap();

        assert_eq!(processed.fidelity, AuditFidelity::Chained);
        assert_eq!(processed.record.metadata["fidelity"], json!("chained"));
        assert_eq!(
            processed.record.metadata["event_metadata"],
            json!({"size": 2048})
        );
        assert_eq!(processed.record.metadata["principal"], json!("alice"));
    }

    #[test]
    fn metadata_only_omits_event_payload() {
        let pipeline = pipeline();
        pipeline.set_tenant_fidelity("t", AuditFidelity::MetadataOnly);

        let processed = pipeline.process_event(event("t", "b"), None, None).unwrap();
        assert_eq!(processed.fidelity, AuditFidelity::MetadataOnly);
        assert!(!processed.record.metadata.contains_key("event_metadata"));
        // Still chained: the ledger always chains.
        assert!(processed.record.previous_hash.is_some());
        assert!(processed.record.record_hash.is_some());
    }

    #[test]
    fn policy_bound_records_carry_the_commitment() {
        let pipeline = pipeline();
        pipeline.set_tenant_fidelity("t", AuditFidelity::PolicyBound);
        let policy = canonical_policy();

        let processed = pipeline
            .process_event(event("t", "b"), Some(&policy), None)
            .unwrap();

        assert_eq!(
            processed.record.policy_commitment.as_deref(),
            Some(policy.commitment_hash.as_str())
        );
        assert_eq!(processed.policy_commitment, Some(policy.commitment_hash));
        assert!(!processed.record.metadata.contains_key("unbound"));
    }

    #[test]
    fn missing_policy_tags_the_record_unbound() {
        let pipeline = pipeline();
        pipeline.set_tenant_fidelity("t", AuditFidelity::PolicyBound);

        let processed = pipeline.process_event(event("t", "b"), None, None).unwrap();
        assert!(processed.record.policy_commitment.is_none());
        assert_eq!(processed.record.metadata["unbound"], json!(true));
    }

    #[test]
    fn merkle_fidelity_sets_the_proof_hint() {
        let pipeline = pipeline();
        pipeline.set_tenant_fidelity("t", AuditFidelity::MerkleProof);
        let policy = canonical_policy();

        let processed = pipeline
            .process_event(event("t", "b"), Some(&policy), None)
            .unwrap();
        assert_eq!(
            processed.record.metadata["supports_merkle_proof"],
            json!(true)
        );
        assert!(processed.record.policy_commitment.is_some());
    }

    #[test]
    fn tenant_override_beats_bucket_and_criticality() {
        let pipeline = pipeline();
        pipeline.set_tenant_fidelity("tenant-1", AuditFidelity::MetadataOnly);
        pipeline.set_bucket_fidelity("tenant-1", "bucket-x", AuditFidelity::MerkleProof);

        let processed = pipeline
            .process_event(
                event("tenant-1", "bucket-x"),
                None,
                Some(PolicyCriticality::Critical),
            )
            .unwrap();
        assert_eq!(processed.fidelity, AuditFidelity::MetadataOnly);
    }

    #[test]
    fn observers_see_processed_events_and_failures_are_contained() {
        let pipeline = pipeline();
        let seen = Arc::new(AtomicU64::new(0));

        pipeline.register_observer(|_| anyhow::bail!("downstream sink offline"));
        {
            let seen = Arc::clone(&seen);
            pipeline.register_observer(move |processed| {
                assert!(!processed.record.record_id.is_empty());
                seen.fetch_add(1, Ordering::Relaxed);
                Ok(())
            });
        }

        pipeline.process_event(event("t", "b"), None, None).unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 1);
        assert_eq!(pipeline.observer_failure_count(), 1);
    }

    #[test]
    fn history_is_bounded() {
        let pipeline = AdaptiveAuditPipeline::new(Arc::new(RwLock::new(AuditLedger::new())))
            .with_history_capacity(3);

        for i in 0..10 {
            let event = ComplianceEvent::new(
                format!("evt-{i}"),
                EventType::ObjectUpdate,
                Utc::now(),
                "t",
                "b",
            );
            pipeline.process_event(event, None, None).unwrap();
        }

        let recent = pipeline.recent_events();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].event.event_id, "evt-7");
        assert_eq!(recent[2].event.event_id, "evt-9");
        assert_eq!(pipeline.stats().total_processed, 10);
    }

    #[test]
    fn stats_track_fidelity_distribution() {
        let pipeline = pipeline();
        pipeline.set_tenant_fidelity("quiet", AuditFidelity::MetadataOnly);

        pipeline.process_event(event("quiet", "b"), None, None).unwrap();
        pipeline.process_event(event("normal", "b"), None, None).unwrap();
        pipeline.process_event(event("normal", "c"), None, None).unwrap();

        let stats = pipeline.stats();
        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.ledger_record_count, 3);
        assert_eq!(stats.fidelity_distribution["metadata_only"], 1);
        assert_eq!(stats.fidelity_distribution["chained"], 2);
    }
}
