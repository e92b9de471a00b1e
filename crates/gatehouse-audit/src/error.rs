//! Audit trail error types.

/// Errors from trail storage and aggregation.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The two records do not form a valid entry/exit pair.
    #[error("invalid entry/exit pair: {message}")]
    InvalidPair {
        /// Why the pair is invalid.
        message: String,
    },

    /// Storage backend error (lock poisoned, persistence failed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
