//! Error types for pipeline processing.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while processing an event into a record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The ledger rejected the synthesized record.
    #[error("ledger append failed: {0}")]
    Ledger(#[from] auditseal_ledger::LedgerError),
}
