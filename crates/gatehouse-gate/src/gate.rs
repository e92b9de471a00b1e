//! The verification gate: the single choke point for entry and exit.

use gatehouse_audit::{
    AccessOutcome, AccessRecord, AccessTrail, CredentialRef, DenialReason, GateEvent,
    PresentedVia,
};
use gatehouse_core::{ActorId, Clock, Timestamp};
use gatehouse_credential::{
    AccessCode, Credential, CredentialStore, EntryDecision, EntryDenial,
};
use std::sync::Arc;

/// The result handed back to the checkpoint console.
///
/// Always present, never an error: the gate answers every presentation
/// with a definite outcome, and the outcome is already on the audit
/// trail by the time the caller sees it.
#[derive(Debug, Clone)]
pub struct Verification {
    /// Granted or denied (with the most specific reason).
    pub outcome: AccessOutcome,
    /// Snapshot of the credential the code resolved to, if any. For
    /// granted entries this is the state after usage was consumed.
    pub credential: Option<Credential>,
    /// The audit record written for this attempt.
    pub record: AccessRecord,
}

impl Verification {
    /// Visit duration for a matched exit, if one was computed.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.record.duration_secs.map(chrono::Duration::seconds)
    }
}

/// Checkpoint logic invoked on every physical entry and exit.
///
/// Entry authorization delegates to the credential store's atomic
/// check-and-consume; the gate's own job is producing exactly one audit
/// record per attempt and never letting a failure escape as anything
/// but a denial.
pub struct VerificationGate {
    credentials: Arc<CredentialStore>,
    trail: Arc<dyn AccessTrail>,
    clock: Arc<dyn Clock>,
}

impl VerificationGate {
    /// Wire up the gate with its collaborators.
    #[must_use]
    pub fn new(
        credentials: Arc<CredentialStore>,
        trail: Arc<dyn AccessTrail>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            trail,
            clock,
        }
    }

    /// Verify a presented code for one entry or exit attempt.
    ///
    /// Exactly one audit record is written on every branch, including
    /// unknown codes. Entries consume usage on success; exits never
    /// touch usage and succeed whenever the code resolves. An exit with
    /// no matching entry is an anomaly worth logging, not a denial.
    ///
    /// A re-presentation after a caller-side timeout is a brand-new
    /// attempt. If the timed-out call actually succeeded, the retry may
    /// consume a second use; the gate does not deduplicate.
    pub fn verify(
        &self,
        code: &AccessCode,
        event: GateEvent,
        method: PresentedVia,
        actor: &ActorId,
        escort_confirmed: bool,
    ) -> Verification {
        let now = self.clock.now();
        match event {
            GateEvent::Entry => self.verify_entry(code, method, actor, escort_confirmed, now),
            GateEvent::Exit => self.verify_exit(code, method, actor, now),
        }
    }

    fn verify_entry(
        &self,
        code: &AccessCode,
        method: PresentedVia,
        actor: &ActorId,
        escort_confirmed: bool,
        now: Timestamp,
    ) -> Verification {
        let (outcome, credential) =
            match self.credentials.authorize_entry(code, now, escort_confirmed) {
                EntryDecision::Granted { credential } => {
                    (AccessOutcome::Granted, Some(credential))
                },
                EntryDecision::Denied { reason, credential } => (
                    AccessOutcome::denied(map_denial(reason)),
                    Some(credential),
                ),
                EntryDecision::UnknownCode => (
                    AccessOutcome::denied(DenialReason::UnknownCredential),
                    None,
                ),
            };

        let record = AccessRecord::new(
            credential_ref(code, credential.as_ref()),
            credential.as_ref().map(|c| c.request.clone()),
            GateEvent::Entry,
            method,
            outcome.clone(),
            actor.clone(),
            now,
        );
        self.append(record.clone());

        Verification {
            outcome,
            credential,
            record,
        }
    }

    fn verify_exit(
        &self,
        code: &AccessCode,
        method: PresentedVia,
        actor: &ActorId,
        now: Timestamp,
    ) -> Verification {
        let Some(credential) = self.credentials.resolve(code) else {
            let outcome = AccessOutcome::denied(DenialReason::UnknownCredential);
            let record = AccessRecord::new(
                credential_ref(code, None),
                None,
                GateEvent::Exit,
                method,
                outcome.clone(),
                actor.clone(),
                now,
            );
            self.append(record.clone());
            return Verification {
                outcome,
                credential: None,
                record,
            };
        };

        // Exits never consult usability or consume usage; anyone inside
        // must be able to leave.
        let mut record = AccessRecord::new(
            CredentialRef::Known {
                credential: credential.id.clone(),
            },
            Some(credential.request.clone()),
            GateEvent::Exit,
            method,
            AccessOutcome::Granted,
            actor.clone(),
            now,
        );

        match self.trail.last_unmatched_entry(&credential.id) {
            Ok(Some(entry)) => {
                record = record.with_matched_entry(entry.id.clone(), now.since(entry.timestamp));
            },
            Ok(None) => {
                tracing::warn!(
                    credential = %credential.id,
                    "exit with no matching entry"
                );
            },
            Err(error) => {
                tracing::error!(
                    credential = %credential.id,
                    %error,
                    "entry matching failed, recording exit without duration"
                );
            },
        }

        self.append(record.clone());
        Verification {
            outcome: AccessOutcome::Granted,
            credential: Some(credential),
            record,
        }
    }

    fn append(&self, record: AccessRecord) {
        // The outcome stands even if the trail write fails; the gate
        // cannot hold a person at the door over a storage fault.
        if let Err(error) = self.trail.append(record) {
            tracing::error!(%error, "failed to append access record");
        }
    }
}

fn credential_ref(code: &AccessCode, credential: Option<&Credential>) -> CredentialRef {
    match credential {
        Some(credential) => CredentialRef::Known {
            credential: credential.id.clone(),
        },
        None => CredentialRef::Unknown {
            presented: code.as_str().to_string(),
        },
    }
}

fn map_denial(denial: EntryDenial) -> DenialReason {
    match denial {
        EntryDenial::Revoked => DenialReason::Revoked,
        EntryDenial::Expired => DenialReason::Expired,
        EntryDenial::UsageExhausted => DenialReason::UsageExhausted,
        EntryDenial::EscortRequired => DenialReason::EscortRequired,
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
