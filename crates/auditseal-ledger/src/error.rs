//! Error types for ledger operations.

use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while appending to or proving against the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A record with this id was already appended. Not recoverable for the
    /// same record; the caller must regenerate an id.
    #[error("duplicate record id: {0}")]
    DuplicateRecord(String),

    /// No record with this id exists in the ledger.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// The record sits in the currently open batch; its tree has not been
    /// sealed, so no inclusion proof exists yet.
    #[error("record {record_id} at position {position} is in the open batch, not yet sealed")]
    NotSealed {
        /// Id of the record the proof was requested for.
        record_id: String,
        /// Ledger position of that record.
        position: usize,
    },
}
