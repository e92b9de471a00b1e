//! Access record types.

use gatehouse_core::{ActorId, CredentialId, RecordId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way someone passed the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateEvent {
    /// Entering the building.
    Entry,
    /// Leaving the building.
    Exit,
}

impl fmt::Display for GateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// How the credential was presented at the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentedVia {
    /// Code scanned from the visitor's device or printout.
    ScannedCode,
    /// Front-desk staff looked the visitor up manually.
    ManualLookup,
    /// Anything else (named free-form).
    Other(String),
}

impl fmt::Display for PresentedVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScannedCode => write!(f, "scanned-code"),
            Self::ManualLookup => write!(f, "manual-lookup"),
            Self::Other(how) => write!(f, "other:{how}"),
        }
    }
}

/// Why access was denied.
///
/// These are outcomes, not errors: the gate always answers, and a denial
/// is a perfectly well-formed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The presented code resolves to no credential.
    UnknownCredential,
    /// The credential was explicitly revoked.
    Revoked,
    /// The credential is past its expiry instant.
    Expired,
    /// All permitted entries were consumed.
    UsageExhausted,
    /// Entry requires an escort and none was confirmed.
    EscortRequired,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCredential => write!(f, "unknown-credential"),
            Self::Revoked => write!(f, "revoked"),
            Self::Expired => write!(f, "expired"),
            Self::UsageExhausted => write!(f, "usage-exhausted"),
            Self::EscortRequired => write!(f, "escort-required"),
        }
    }
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Access granted.
    Granted,
    /// Access denied.
    Denied {
        /// The most specific applicable reason.
        reason: DenialReason,
    },
}

impl AccessOutcome {
    /// Create a denied outcome.
    #[must_use]
    pub fn denied(reason: DenialReason) -> Self {
        Self::Denied { reason }
    }

    /// Whether access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// The denial reason, if denied.
    #[must_use]
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Denied { reason } => Some(*reason),
            Self::Granted => None,
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied { reason } => write!(f, "denied ({reason})"),
        }
    }
}

/// What the record points at.
///
/// Attempts with a code that resolves to nothing still get a record, so
/// security review sees probing; those carry the presented value instead
/// of a credential link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ref", rename_all = "snake_case")]
pub enum CredentialRef {
    /// The attempt resolved to a known credential.
    Known {
        /// The credential's stable ID.
        credential: CredentialId,
    },
    /// The attempt did not resolve; the raw presented value is kept for
    /// review.
    Unknown {
        /// What was presented at the gate.
        presented: String,
    },
}

impl CredentialRef {
    /// The credential ID, for resolved attempts.
    #[must_use]
    pub fn credential_id(&self) -> Option<&CredentialId> {
        match self {
            Self::Known { credential } => Some(credential),
            Self::Unknown { .. } => None,
        }
    }
}

/// One immutable audit trail entry: a single entry/exit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Unique record identifier.
    pub id: RecordId,
    /// Credential the attempt was made against (or the unresolved value).
    pub credential: CredentialRef,
    /// Owning request, when the credential resolved.
    pub request: Option<RequestId>,
    /// Entry or exit.
    pub event: GateEvent,
    /// How the credential was presented.
    pub method: PresentedVia,
    /// Granted or denied (with reason).
    pub outcome: AccessOutcome,
    /// The verifying staff member or device.
    pub actor: ActorId,
    /// When the attempt happened.
    pub timestamp: Timestamp,
    /// For exits: the entry record this exit closes, if one was found.
    pub matched_entry: Option<RecordId>,
    /// For matched exits: seconds between entry and exit.
    pub duration_secs: Option<i64>,
}

impl AccessRecord {
    /// Create a record with no exit-matching metadata.
    #[must_use]
    pub fn new(
        credential: CredentialRef,
        request: Option<RequestId>,
        event: GateEvent,
        method: PresentedVia,
        outcome: AccessOutcome,
        actor: ActorId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: RecordId::new(),
            credential,
            request,
            event,
            method,
            outcome,
            actor,
            timestamp,
            matched_entry: None,
            duration_secs: None,
        }
    }

    /// Attach the entry this exit closes and the computed duration.
    #[must_use]
    pub fn with_matched_entry(mut self, entry: RecordId, duration: chrono::Duration) -> Self {
        self.matched_entry = Some(entry);
        self.duration_secs = Some(duration.num_seconds());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(event: GateEvent, outcome: AccessOutcome) -> AccessRecord {
        AccessRecord::new(
            CredentialRef::Known {
                credential: CredentialId::new(),
            },
            Some(RequestId::new()),
            event,
            PresentedVia::ScannedCode,
            outcome,
            ActorId::new("desk-01"),
            Timestamp::now(),
        )
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(AccessOutcome::Granted.is_granted());
        let denied = AccessOutcome::denied(DenialReason::Expired);
        assert!(!denied.is_granted());
        assert_eq!(denied.denial_reason(), Some(DenialReason::Expired));
    }

    #[test]
    fn test_denial_reason_display() {
        assert_eq!(DenialReason::UnknownCredential.to_string(), "unknown-credential");
        assert_eq!(DenialReason::UsageExhausted.to_string(), "usage-exhausted");
        assert_eq!(DenialReason::EscortRequired.to_string(), "escort-required");
    }

    #[test]
    fn test_unknown_ref_keeps_presented_value() {
        let rec = AccessRecord::new(
            CredentialRef::Unknown {
                presented: "deadbeef".to_string(),
            },
            None,
            GateEvent::Entry,
            PresentedVia::ScannedCode,
            AccessOutcome::denied(DenialReason::UnknownCredential),
            ActorId::new("gate-2"),
            Timestamp::now(),
        );
        assert!(rec.credential.credential_id().is_none());
        assert!(rec.request.is_none());
    }

    #[test]
    fn test_matched_exit() {
        let entry = sample(GateEvent::Entry, AccessOutcome::Granted);
        let exit = sample(GateEvent::Exit, AccessOutcome::Granted)
            .with_matched_entry(entry.id.clone(), chrono::Duration::minutes(42));
        assert_eq!(exit.matched_entry, Some(entry.id));
        assert_eq!(exit.duration_secs, Some(42 * 60));
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let rec = sample(
            GateEvent::Entry,
            AccessOutcome::denied(DenialReason::Revoked),
        );
        let json = serde_json::to_string(&rec).unwrap();
        let back: AccessRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
