//! Gatehouse Approval - the request approval workflow.
//!
//! Owns every request state transition and is the only code path that
//! mints credentials: a credential exists if and only if an approver
//! moved its request from `pending` to `approved`.
//!
//! Collaborators (clock, blacklist, actor directory) are injected at
//! construction so policy and expiry behavior are deterministic under
//! test.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod draft;
mod error;
mod request;
mod store;
mod workflow;

pub use draft::RequestDraft;
pub use error::{ApprovalError, ApprovalResult, FieldViolation};
pub use request::{
    Decision, RequestKind, RequestStatus, RequesterInfo, VisitRequest, VisitWindow,
};
pub use store::RequestStore;
pub use workflow::{ApprovalWorkflow, ApproveParams, Approved};
