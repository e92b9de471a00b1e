//! Approval workflow error types.

use gatehouse_credential::CredentialError;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::request::RequestStatus;

/// One field that failed draft validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// The offending field, e.g. `"phone"` or `"window.start"`.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors from request submission and decision operations.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// One or more draft fields are invalid. Carries every violation, not
    /// just the first.
    #[error("validation failed: {}", format_violations(.violations))]
    Validation {
        /// All violated fields.
        violations: Vec<FieldViolation>,
    },

    /// The requester matched the blacklist; no request was created.
    #[error("requester \"{name}\" is blacklisted")]
    Blacklisted {
        /// The name that matched.
        name: String,
    },

    /// No request with this ID exists.
    #[error("request {request_id} not found")]
    NotFound {
        /// The missing ID.
        request_id: String,
    },

    /// The request is not in a state that allows this transition.
    #[error("request {request_id} is {status}, not pending")]
    InvalidState {
        /// The request in question.
        request_id: String,
        /// Its current status.
        status: RequestStatus,
    },

    /// The actor may not perform this action.
    #[error("actor {actor} is not authorized to {action}")]
    NotAuthorized {
        /// Who attempted the action.
        actor: String,
        /// What was attempted.
        action: String,
    },

    /// Expected-version mismatch on a decision operation.
    #[error("request {request_id} version conflict: expected {expected}, found {actual}")]
    Conflict {
        /// The request in question.
        request_id: String,
        /// The version the caller expected.
        expected: u64,
        /// The version actually stored.
        actual: u64,
    },

    /// Credential issuance failed during approval.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Storage backend error (lock poisoned, persistence failed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApprovalError {
    /// A validation error with a single violation.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![FieldViolation::new(field, message)],
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
