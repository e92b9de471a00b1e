//! Gate-side query error types.
//!
//! Note that [`VerificationGate::verify`] deliberately has no error
//! type: a physical checkpoint needs a definite outcome, so every
//! failure there is a denial, not an error. These errors belong to the
//! read-side history queries only.
//!
//! [`VerificationGate::verify`]: crate::VerificationGate::verify

use gatehouse_audit::AuditError;

/// Errors from audit history queries.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The queried request or credential ID does not exist. Distinct
    /// from an existing ID with no records, which is an empty result.
    #[error("{id} not found")]
    NotFound {
        /// The missing ID, with its type prefix.
        id: String,
    },

    /// The audit trail backend failed.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Storage backend error (lock poisoned, persistence failed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for gate queries.
pub type GateResult<T> = Result<T, GateError>;
