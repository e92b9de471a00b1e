use super::*;
use chrono::Duration;
use gatehouse_audit::MemoryAccessTrail;
use gatehouse_core::{ManualClock, Permission, RequestId};
use gatehouse_credential::{IssueParams, UsageLimit};
use std::collections::BTreeSet;

struct Fixture {
    gate: VerificationGate,
    credentials: Arc<CredentialStore>,
    trail: Arc<MemoryAccessTrail>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let credentials = Arc::new(CredentialStore::new());
    let trail = Arc::new(MemoryAccessTrail::new());
    let clock = Arc::new(ManualClock::at_wall_clock());
    let gate = VerificationGate::new(
        Arc::clone(&credentials),
        Arc::clone(&trail) as Arc<dyn AccessTrail>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Fixture {
        gate,
        credentials,
        trail,
        clock,
    }
}

fn issue(fx: &Fixture, usage_limit: UsageLimit, permissions: BTreeSet<Permission>) -> Credential {
    let now = fx.clock.now();
    fx.credentials
        .issue(
            RequestId::new(),
            IssueParams {
                expires_at: now.plus(Duration::hours(8)),
                usage_limit,
                permissions,
            },
            now,
        )
        .unwrap()
}

fn desk() -> ActorId {
    ActorId::new("desk-01")
}

#[test]
fn test_entry_granted_consumes_usage_and_records() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Limited(2), BTreeSet::new());

    let verification = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );

    assert!(verification.outcome.is_granted());
    assert_eq!(verification.credential.unwrap().usage_count, 1);
    assert_eq!(fx.trail.count().unwrap(), 1);
    assert_eq!(verification.record.request, Some(credential.request));
}

#[test]
fn test_unknown_code_denied_and_still_recorded() {
    let fx = fixture();

    let verification = fx.gate.verify(
        &AccessCode::from_value("not-a-real-code"),
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );

    assert_eq!(
        verification.outcome.denial_reason(),
        Some(DenialReason::UnknownCredential)
    );
    assert!(verification.credential.is_none());

    // The attempt is on the trail with the raw presented value.
    let records = fx.trail.in_range(None, None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].credential,
        CredentialRef::Unknown {
            presented: "not-a-real-code".to_string(),
        }
    );
}

#[test]
fn test_expired_entry_denied_with_reason() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Unlimited, BTreeSet::new());

    fx.clock.advance(Duration::hours(9));
    let verification = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );

    assert_eq!(
        verification.outcome.denial_reason(),
        Some(DenialReason::Expired)
    );
    assert_eq!(fx.trail.count().unwrap(), 1);
}

#[test]
fn test_revoked_wins_over_expired() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Unlimited, BTreeSet::new());
    fx.credentials
        .revoke(&credential.id, desk(), "badge reported lost", None, fx.clock.now())
        .unwrap();

    fx.clock.advance(Duration::hours(9));
    let verification = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );

    assert_eq!(
        verification.outcome.denial_reason(),
        Some(DenialReason::Revoked)
    );
}

#[test]
fn test_escort_required_blocks_entry_not_exit() {
    let fx = fixture();
    let credential = issue(
        &fx,
        UsageLimit::Unlimited,
        BTreeSet::from([Permission::Standard, Permission::EscortRequired]),
    );

    let denied = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert_eq!(
        denied.outcome.denial_reason(),
        Some(DenialReason::EscortRequired)
    );

    let granted = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        true,
    );
    assert!(granted.outcome.is_granted());

    // No escort confirmation on the way out; still fine.
    let exit = fx.gate.verify(
        &credential.code,
        GateEvent::Exit,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert!(exit.outcome.is_granted());
}

#[test]
fn test_exit_matches_entry_and_computes_duration() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Limited(1), BTreeSet::new());

    let entry = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );

    fx.clock.advance(Duration::minutes(45));
    let exit = fx.gate.verify(
        &credential.code,
        GateEvent::Exit,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );

    assert!(exit.outcome.is_granted());
    assert_eq!(exit.record.matched_entry, Some(entry.record.id));
    assert_eq!(exit.duration(), Some(Duration::minutes(45)));
}

#[test]
fn test_exit_without_entry_is_granted_anomaly() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Limited(1), BTreeSet::new());

    let exit = fx.gate.verify(
        &credential.code,
        GateEvent::Exit,
        PresentedVia::ManualLookup,
        &desk(),
        false,
    );

    assert!(exit.outcome.is_granted());
    assert!(exit.record.matched_entry.is_none());
    assert!(exit.duration().is_none());
    assert_eq!(fx.trail.count().unwrap(), 1);
}

#[test]
fn test_exits_never_consume_usage() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Limited(1), BTreeSet::new());

    for _ in 0..3 {
        let exit = fx.gate.verify(
            &credential.code,
            GateEvent::Exit,
            PresentedVia::ScannedCode,
            &desk(),
            false,
        );
        assert!(exit.outcome.is_granted());
    }

    let stored = fx.credentials.get(&credential.id).unwrap().unwrap();
    assert_eq!(stored.usage_count, 0);
}

#[test]
fn test_exhausted_entry_denied_but_exit_allowed() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Limited(1), BTreeSet::new());

    assert!(
        fx.gate
            .verify(
                &credential.code,
                GateEvent::Entry,
                PresentedVia::ScannedCode,
                &desk(),
                false,
            )
            .outcome
            .is_granted()
    );

    let second = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert_eq!(
        second.outcome.denial_reason(),
        Some(DenialReason::UsageExhausted)
    );

    let exit = fx.gate.verify(
        &credential.code,
        GateEvent::Exit,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert!(exit.outcome.is_granted());
    assert_eq!(fx.trail.count().unwrap(), 3);
}

#[test]
fn test_refreshed_code_old_presentation_is_unknown() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Unlimited, BTreeSet::new());
    fx.credentials
        .refresh(&credential.id, None, fx.clock.now())
        .unwrap();

    let verification = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert_eq!(
        verification.outcome.denial_reason(),
        Some(DenialReason::UnknownCredential)
    );
}

#[test]
fn test_two_entries_match_their_own_exits() {
    let fx = fixture();
    let credential = issue(&fx, UsageLimit::Unlimited, BTreeSet::new());

    let first_entry = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    fx.clock.advance(Duration::minutes(10));
    let first_exit = fx.gate.verify(
        &credential.code,
        GateEvent::Exit,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert_eq!(first_exit.record.matched_entry, Some(first_entry.record.id));

    fx.clock.advance(Duration::minutes(10));
    let second_entry = fx.gate.verify(
        &credential.code,
        GateEvent::Entry,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    fx.clock.advance(Duration::minutes(20));
    let second_exit = fx.gate.verify(
        &credential.code,
        GateEvent::Exit,
        PresentedVia::ScannedCode,
        &desk(),
        false,
    );
    assert_eq!(
        second_exit.record.matched_entry,
        Some(second_entry.record.id)
    );
    assert_eq!(second_exit.duration(), Some(Duration::minutes(20)));
}
