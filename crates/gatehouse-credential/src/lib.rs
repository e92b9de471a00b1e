//! Gatehouse Credential - issuance, renewal and usage accounting.
//!
//! A [`Credential`] is the time- and usage-bounded access token minted
//! when a request is approved. It is rendered to the visitor as a
//! scannable [`AccessCode`]; the code is the only thing a gate ever sees.
//!
//! # Lifecycle
//!
//! - Created by the approval workflow via [`CredentialStore::issue`]
//! - Renewed with a fresh code via [`CredentialStore::refresh`]
//!   (the previous code fails verification immediately, no grace period)
//! - Terminated via [`CredentialStore::revoke`] (idempotent)
//!
//! # Usability
//!
//! The stored `status` field is a cache, never the authority: whether a
//! credential is usable is re-derived from `expires_at` and the usage
//! counters on every check, against an explicit `now`. See
//! [`Credential::usability`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod code;
mod credential;
mod error;
mod store;

pub use code::AccessCode;
pub use credential::{Credential, CredentialStatus, Revocation, Usability, UsageLimit};
pub use error::{CredentialError, CredentialResult};
pub use store::{CredentialStore, EntryDecision, EntryDenial, IssueParams};
