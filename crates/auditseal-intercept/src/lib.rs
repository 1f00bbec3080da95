//! # AuditSeal Compliance Event Interceptor
//!
//! Bounded in-memory intake buffer sitting between event producers in the
//! storage control plane and the audit pipeline. The interceptor decouples
//! the two sides: producers push concurrently and never block, a single
//! consumer drains with a cooperative timeout, and completeness counters let
//! callers that can count events at the producer confirm nothing was lost.
//!
//! ## Contract
//!
//! - `intercept` is non-blocking. On overflow it returns `false` and the
//!   event is dropped; callers treat `false` as a durability failure and
//!   escalate. The interceptor never silently discards while reporting
//!   success.
//! - Observers run synchronously in registration order against a snapshot of
//!   the observer list. An observer error is logged and counted; it never
//!   aborts ingestion of the event.
//! - Events are raw input, not tamper-protected. Only the records derived
//!   from them downstream are.
//!
//! ## Example
//!
//! ```rust
//! use auditseal_intercept::{ComplianceEvent, EventInterceptor, EventType};
//! use chrono::Utc;
//!
//! let interceptor = EventInterceptor::with_capacity(16);
//!
//! let event = ComplianceEvent::new(
//!     "evt-1",
//!     EventType::ObjectCreate,
//!     Utc::now(),
//!     "tenant-1",
//!     "bucket-a",
//! );
//!
//! assert!(interceptor.intercept(event));
//! assert!(interceptor.verify_completeness(1));
//!
//! let drained = interceptor.get_event(None).unwrap();
//! assert_eq!(drained.event_id, "evt-1");
//! ```

pub mod error;
pub mod event;
pub mod filter;
pub mod interceptor;

pub use error::{InterceptError, Result};
pub use event::{ComplianceEvent, EventType};
pub use filter::EventFilter;
pub use interceptor::{EventInterceptor, DEFAULT_QUEUE_CAPACITY};
