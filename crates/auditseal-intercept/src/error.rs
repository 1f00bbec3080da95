//! Error types for event interception.

use thiserror::Error;

/// Result type alias for interceptor operations.
pub type Result<T> = std::result::Result<T, InterceptError>;

/// Errors that can occur while intercepting events.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// The bounded queue is at capacity; the event was dropped. Callers must
    /// treat this as a durability failure and escalate.
    #[error("event queue full at capacity {capacity}")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },
}
