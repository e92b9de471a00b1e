//! Gatehouse Audit - the append-only access trail.
//!
//! Every entry/exit attempt at a gate - granted or denied, even for a
//! code that resolves to nothing - produces exactly one immutable
//! [`AccessRecord`]. Records are never updated or deleted; the trail
//! only grows.
//!
//! # Anomalies
//!
//! An exit with no matching entry is recorded and allowed, not rejected:
//! a physical gate must always let people out. Such records simply carry
//! no matched-entry reference and no duration.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod record;
mod trail;

pub use error::{AuditError, AuditResult};
pub use record::{AccessOutcome, AccessRecord, CredentialRef, DenialReason, GateEvent, PresentedVia};
pub use trail::{AccessTrail, MemoryAccessTrail, compute_duration};
