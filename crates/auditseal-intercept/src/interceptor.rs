//! The bounded event intake queue.

use crate::error::{InterceptError, Result};
use crate::event::ComplianceEvent;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Queue capacity unless configured otherwise.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Callback invoked synchronously for every intercepted event.
///
/// Observer errors are logged and counted; they never abort ingestion.
pub type EventObserver = Arc<dyn Fn(&ComplianceEvent) -> anyhow::Result<()> + Send + Sync>;

/// Bounded multi-producer event intake with completeness counters.
///
/// Producers call [`intercept`](Self::intercept) concurrently; a single
/// consumer drains with [`get_event`](Self::get_event). The queue never
/// blocks a producer: when full, the event is dropped, the drop is counted,
/// and the caller is told.
///
/// # Metrics
///
/// Swallowed failures surface as counters rather than side-channel prints:
/// [`dropped_count`](Self::dropped_count) for overflow drops and
/// [`observer_failure_count`](Self::observer_failure_count) for observer
/// errors.
pub struct EventInterceptor {
    queue: Mutex<VecDeque<ComplianceEvent>>,
    available: Condvar,
    observers: RwLock<Vec<EventObserver>>,
    capacity: usize,
    event_count: AtomicU64,
    dropped_count: AtomicU64,
    observer_failures: AtomicU64,
}

impl EventInterceptor {
    /// Creates an interceptor with [`DEFAULT_QUEUE_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates an interceptor with an explicit queue capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            available: Condvar::new(),
            observers: RwLock::new(Vec::new()),
            capacity,
            event_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            observer_failures: AtomicU64::new(0),
        }
    }

    /// Registers an observer. Observers are invoked in registration order.
    pub fn register_observer<F>(&self, observer: F)
    where
        F: Fn(&ComplianceEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observers.write().push(Arc::new(observer));
    }

    /// Non-blocking enqueue. Returns an error when the queue is full; the
    /// event is dropped and counted in that case.
    pub fn try_intercept(&self, event: ComplianceEvent) -> Result<()> {
        {
            let mut queue = self.queue.lock();
            if queue.len() >= self.capacity {
                drop(queue);
                self.dropped_count.fetch_add(1, Ordering::Relaxed);
                warn!(
                    event_id = %event.event_id,
                    capacity = self.capacity,
                    "event queue full, dropping event"
                );
                return Err(InterceptError::QueueFull {
                    capacity: self.capacity,
                });
            }
            queue.push_back(event.clone());
        }
        self.available.notify_one();
        self.event_count.fetch_add(1, Ordering::Relaxed);

        // Snapshot under the read guard, invoke without holding it.
        let observers: Vec<EventObserver> = self.observers.read().clone();
        for observer in observers {
            if let Err(error) = observer(&event) {
                self.observer_failures.fetch_add(1, Ordering::Relaxed);
                warn!(event_id = %event.event_id, %error, "event observer failed");
            }
        }

        Ok(())
    }

    /// Boolean form of [`try_intercept`](Self::try_intercept): `false` means
    /// the event was dropped and the caller must escalate.
    pub fn intercept(&self, event: ComplianceEvent) -> bool {
        self.try_intercept(event).is_ok()
    }

    /// Dequeues the oldest event.
    ///
    /// With `timeout: None` this is non-blocking. With a timeout the call
    /// waits cooperatively until an event arrives or the deadline passes.
    pub fn get_event(&self, timeout: Option<Duration>) -> Option<ComplianceEvent> {
        let mut queue = self.queue.lock();
        if let Some(event) = queue.pop_front() {
            return Some(event);
        }

        let timeout = timeout?;
        let deadline = Instant::now() + timeout;
        loop {
            let timed_out = self.available.wait_until(&mut queue, deadline).timed_out();
            if let Some(event) = queue.pop_front() {
                return Some(event);
            }
            if timed_out {
                return None;
            }
        }
    }

    /// Total events accepted since construction. Monotonically increasing;
    /// drops are not counted here.
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::Relaxed)
    }

    /// Equality check against a count kept independently at the producer.
    pub fn verify_completeness(&self, expected: u64) -> bool {
        self.event_count() == expected
    }

    /// Events dropped due to overflow.
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Observer invocations that returned an error.
    pub fn observer_failure_count(&self) -> u64 {
        self.observer_failures.load(Ordering::Relaxed)
    }

    /// Events currently buffered.
    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventInterceptor {
    fn default() -> Self {
        Self::new()
    }
}
