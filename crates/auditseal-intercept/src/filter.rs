//! Event filtering.

use crate::event::{ComplianceEvent, EventType};
use std::collections::HashSet;

/// Conjunction of tenant, bucket and event-type membership filters.
///
/// An empty dimension is a wildcard: a filter with no tenant entries matches
/// every tenant, and a freshly constructed filter matches every event.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    tenants: HashSet<String>,
    buckets: HashSet<String>,
    event_types: HashSet<EventType>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenants.insert(tenant_id.into());
        self
    }

    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.buckets.insert(bucket.into());
        self
    }

    #[must_use]
    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_types.insert(event_type);
        self
    }

    /// True when the event passes every non-empty dimension.
    pub fn matches(&self, event: &ComplianceEvent) -> bool {
        if !self.tenants.is_empty() && !self.tenants.contains(&event.tenant_id) {
            return false;
        }
        if !self.buckets.is_empty() && !self.buckets.contains(&event.bucket) {
            return false;
        }
        if !self.event_types.is_empty() && !self.event_types.contains(&event.event_type) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(tenant: &str, bucket: &str, event_type: EventType) -> ComplianceEvent {
        ComplianceEvent::new("evt", event_type, Utc::now(), tenant, bucket)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EventFilter::new();
        assert!(filter.matches(&event("any", "bucket", EventType::ObjectRead)));
    }

    #[test]
    fn single_dimension_filters() {
        let filter = EventFilter::new().with_tenant("tenant-1");
        assert!(filter.matches(&event("tenant-1", "b", EventType::ObjectCreate)));
        assert!(!filter.matches(&event("tenant-2", "b", EventType::ObjectCreate)));
    }

    #[test]
    fn dimensions_are_conjunctive() {
        let filter = EventFilter::new()
            .with_tenant("tenant-1")
            .with_bucket("sensitive")
            .with_event_type(EventType::ObjectDelete);

        assert!(filter.matches(&event("tenant-1", "sensitive", EventType::ObjectDelete)));
        assert!(!filter.matches(&event("tenant-1", "sensitive", EventType::ObjectCreate)));
        assert!(!filter.matches(&event("tenant-1", "public", EventType::ObjectDelete)));
        assert!(!filter.matches(&event("tenant-2", "sensitive", EventType::ObjectDelete)));
    }

    #[test]
    fn membership_is_a_union_within_a_dimension() {
        let filter = EventFilter::new()
            .with_tenant("tenant-1")
            .with_tenant("tenant-2");

        assert!(filter.matches(&event("tenant-1", "b", EventType::ObjectRead)));
        assert!(filter.matches(&event("tenant-2", "b", EventType::ObjectRead)));
        assert!(!filter.matches(&event("tenant-3", "b", EventType::ObjectRead)));
    }
}
