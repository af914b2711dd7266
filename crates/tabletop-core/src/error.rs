//! Domain error types.

use thiserror::Error;

use crate::record::RecordId;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record was not found.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// A record with the same identifier already exists in its collection.
    #[error("record already exists: {0}")]
    DuplicateRecord(RecordId),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on record {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The record that had the conflict.
        id: RecordId,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
