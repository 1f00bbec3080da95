//! Error types for policy compilation and lookup.

use thiserror::Error;

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors that can occur while compiling or resolving policies.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Structural problem in an incoming policy: an unrecognized effect or
    /// action value, or a duplicate statement `sid`.
    #[error("malformed policy: {0}")]
    Malformed(String),

    /// A lookup or strict verification referenced a policy id the store has
    /// never compiled.
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),
}
