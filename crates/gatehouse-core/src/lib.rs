//! Gatehouse Core - Foundation types for the Gatehouse access engine.
//!
//! This crate provides:
//! - Entity identifiers used across the engine
//! - The `Timestamp` wrapper and the injected [`Clock`] trait
//! - Permission and access-level types carried by credentials
//! - Collaborator traits the engine consumes from the outside world
//!   ([`Blacklist`], [`ActorDirectory`])
//!
//! Everything time-dependent in the engine takes an explicit `now`; the
//! wall clock is only ever read through a [`Clock`] implementation so
//! expiry and usage logic stay deterministically testable.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod blacklist;
mod clock;
mod directory;
mod permission;
mod types;

pub use blacklist::{Blacklist, NoBlacklist, StaticBlacklist};
pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{ActorDirectory, ActorRole, StaticDirectory};
pub use permission::{AccessLevel, Permission};
pub use types::{ActorId, CredentialId, MerchantId, RecordId, RequestId, Timestamp};
