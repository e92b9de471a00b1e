//! Credential error types.

use crate::credential::CredentialStatus;

/// Errors from credential issuance, renewal and lookup.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Malformed issuance parameters; recoverable by caller correction.
    #[error("invalid credential parameters: {message}")]
    Validation {
        /// What was wrong with the parameters.
        message: String,
    },

    /// No credential with the given ID.
    #[error("credential not found: {credential_id}")]
    NotFound {
        /// The ID that failed to resolve.
        credential_id: String,
    },

    /// Operation not legal in the credential's current status.
    #[error("credential {credential_id} is {status}, operation requires active")]
    InvalidState {
        /// The credential in question.
        credential_id: String,
        /// Its current status.
        status: CredentialStatus,
    },

    /// Expected-version mismatch on a compare-and-set mutation.
    #[error("version conflict on {credential_id}: expected {expected}, actual {actual}")]
    Conflict {
        /// The credential in question.
        credential_id: String,
        /// Version the caller expected.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },

    /// Storage backend error (lock poisoned, persistence failed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;
