//! Gatehouse Gate - checkpoint verification and audit queries.
//!
//! [`VerificationGate::verify`] is the single choke point every physical
//! entry and exit passes through. It enforces expiry, revocation, usage
//! and escort rules, writes exactly one [`AccessRecord`] per attempt,
//! and never fails: a checkpoint always gets a definite granted/denied
//! answer, because a door cannot retry an exception.
//!
//! [`AccessHistory`] is the matching read side, aggregating the trail
//! per request or credential.
//!
//! [`AccessRecord`]: gatehouse_audit::AccessRecord

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod gate;
mod history;

pub use error::{GateError, GateResult};
pub use gate::{Verification, VerificationGate};
pub use history::{AccessHistory, HistoryKey};
