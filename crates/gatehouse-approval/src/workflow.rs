//! The approval workflow: sole owner of request transitions and the only
//! producer of credentials.

use gatehouse_core::{
    AccessLevel, ActorDirectory, ActorId, Blacklist, Clock, Permission, RequestId, Timestamp,
};
use gatehouse_credential::{Credential, CredentialStore, IssueParams, UsageLimit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::draft::RequestDraft;
use crate::error::{ApprovalError, ApprovalResult};
use crate::request::{Decision, RequestStatus, VisitRequest};
use crate::store::RequestStore;

/// What an approver grants when approving a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveParams {
    /// Coarse access tier; expands into base permissions.
    pub access_level: AccessLevel,
    /// Extra permissions on top of the tier's base set.
    pub permissions: BTreeSet<Permission>,
    /// Force the escort requirement regardless of tier.
    pub escort_required: bool,
    /// Free-form approval notes.
    pub notes: Option<String>,
    /// Credential expiry instant.
    pub expires_at: Timestamp,
    /// Credential entry budget.
    pub usage_limit: UsageLimit,
    /// Optimistic-concurrency guard; `None` skips the check.
    pub expected_version: Option<u64>,
}

/// A successful approval: the transitioned request and its credential.
#[derive(Debug, Clone)]
pub struct Approved {
    /// The request, now in `approved` status.
    pub request: VisitRequest,
    /// The freshly minted credential.
    pub credential: Credential,
}

/// State machine over requests. Injected collaborators (clock, blacklist,
/// actor directory) make expiry and policy logic deterministic in tests.
pub struct ApprovalWorkflow {
    requests: Arc<RequestStore>,
    credentials: Arc<CredentialStore>,
    blacklist: Arc<dyn Blacklist>,
    directory: Arc<dyn ActorDirectory>,
    clock: Arc<dyn Clock>,
}

impl ApprovalWorkflow {
    /// Wire up the workflow with its collaborators.
    #[must_use]
    pub fn new(
        requests: Arc<RequestStore>,
        credentials: Arc<CredentialStore>,
        blacklist: Arc<dyn Blacklist>,
        directory: Arc<dyn ActorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            credentials,
            blacklist,
            directory,
            clock,
        }
    }

    /// Submit a draft, creating a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] listing every violated
    /// field, or [`ApprovalError::Blacklisted`] if the requester matches
    /// the blacklist (in which case no request is created).
    pub fn submit(&self, draft: RequestDraft) -> ApprovalResult<VisitRequest> {
        let now = self.clock.now();
        draft
            .validate(now)
            .map_err(|violations| ApprovalError::Validation { violations })?;

        if self
            .blacklist
            .is_blacklisted(&draft.requester.name, &draft.requester.phone)
        {
            tracing::warn!(name = %draft.requester.name, "blacklisted submission refused");
            return Err(ApprovalError::Blacklisted {
                name: draft.requester.name,
            });
        }

        let request = VisitRequest {
            id: RequestId::new(),
            requester: draft.requester,
            merchant: draft.merchant,
            contact: draft.contact,
            purpose: draft.purpose,
            kind: draft.kind,
            status: RequestStatus::Pending,
            submitted_at: now,
            version: 0,
        };
        self.requests.insert(request.clone())?;

        tracing::info!(request = %request.id, merchant = %request.merchant, "request submitted");
        Ok(request)
    }

    /// Approve a pending request and mint its credential.
    ///
    /// The request transition and the credential issuance are atomic from
    /// the caller's perspective: if issuance fails, the request stays
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown ID,
    /// [`ApprovalError::NotAuthorized`] if the actor may not decide for
    /// the request's merchant, [`ApprovalError::Conflict`] on a version
    /// mismatch, [`ApprovalError::InvalidState`] if the request is not
    /// pending, or [`ApprovalError::Credential`] if issuance fails.
    pub fn approve(
        &self,
        request_id: &RequestId,
        actor: &ActorId,
        params: ApproveParams,
    ) -> ApprovalResult<Approved> {
        let now = self.clock.now();
        self.requests.modify(request_id, |request| {
            self.check_decision_rights(actor, request, "approve")?;
            check_version(request, params.expected_version)?;

            let mut permissions = params.access_level.base_permissions();
            permissions.extend(params.permissions.clone());
            if params.escort_required {
                permissions.insert(Permission::EscortRequired);
            }

            let next = RequestStatus::Approved {
                decision: Decision {
                    actor: actor.clone(),
                    notes: params.notes.clone().unwrap_or_default(),
                    at: now,
                },
            };
            if !request.status.allows_transition_to(&next) {
                return Err(ApprovalError::InvalidState {
                    request_id: request_id.to_string(),
                    status: request.status.clone(),
                });
            }

            // All checks passed; issuance is the last fallible step, so a
            // failure here leaves the request untouched.
            let credential = self.credentials.issue(
                request.id.clone(),
                IssueParams {
                    expires_at: params.expires_at,
                    usage_limit: params.usage_limit,
                    permissions,
                },
                now,
            )?;

            request.status = next;
            request.version = request.version.saturating_add(1);

            tracing::info!(
                request = %request.id,
                credential = %credential.id,
                actor = %actor,
                "request approved"
            );
            Ok(Approved {
                request: request.clone(),
                credential,
            })
        })
    }

    /// Reject a pending request. No credential is created.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] if `reason` is empty, plus
    /// the same not-found/authorization/conflict/state errors as
    /// [`ApprovalWorkflow::approve`].
    pub fn reject(
        &self,
        request_id: &RequestId,
        actor: &ActorId,
        reason: impl Into<String>,
        expected_version: Option<u64>,
    ) -> ApprovalResult<VisitRequest> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ApprovalError::invalid_field(
                "reason",
                "a rejection reason is required",
            ));
        }

        let now = self.clock.now();
        self.requests.modify(request_id, |request| {
            self.check_decision_rights(actor, request, "reject")?;
            check_version(request, expected_version)?;

            let next = RequestStatus::Rejected {
                decision: Decision {
                    actor: actor.clone(),
                    notes: reason.clone(),
                    at: now,
                },
            };
            if !request.status.allows_transition_to(&next) {
                return Err(ApprovalError::InvalidState {
                    request_id: request_id.to_string(),
                    status: request.status.clone(),
                });
            }

            request.status = next;
            request.version = request.version.saturating_add(1);

            tracing::info!(request = %request.id, actor = %actor, "request rejected");
            Ok(request.clone())
        })
    }

    /// Withdraw a pending request. Only the original requester may do
    /// this, verified by a phone match rather than a directory role.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown ID,
    /// [`ApprovalError::NotAuthorized`] on a phone mismatch, or
    /// [`ApprovalError::InvalidState`] if the request is not pending.
    pub fn withdraw(
        &self,
        request_id: &RequestId,
        requester_phone: &str,
    ) -> ApprovalResult<VisitRequest> {
        let now = self.clock.now();
        self.requests.modify(request_id, |request| {
            if request.requester.phone != requester_phone {
                return Err(ApprovalError::NotAuthorized {
                    actor: "requester".to_string(),
                    action: format!("withdraw request {request_id}"),
                });
            }

            let next = RequestStatus::Withdrawn { at: now };
            if !request.status.allows_transition_to(&next) {
                return Err(ApprovalError::InvalidState {
                    request_id: request_id.to_string(),
                    status: request.status.clone(),
                });
            }

            request.status = next;
            request.version = request.version.saturating_add(1);

            tracing::info!(request = %request.id, "request withdrawn");
            Ok(request.clone())
        })
    }

    /// Approve each request independently with the same decision.
    ///
    /// One request's failure neither blocks nor rolls back its siblings;
    /// results come back per ID in input order. The shared decision
    /// carries no expected version, since a meaningful one cannot apply
    /// across different requests.
    pub fn approve_batch(
        &self,
        request_ids: &[RequestId],
        actor: &ActorId,
        shared: &ApproveParams,
    ) -> Vec<(RequestId, ApprovalResult<Approved>)> {
        request_ids
            .iter()
            .map(|id| {
                let params = ApproveParams {
                    expected_version: None,
                    ..shared.clone()
                };
                (id.clone(), self.approve(id, actor, params))
            })
            .collect()
    }

    /// Move approved visitor requests whose window has fully elapsed to
    /// `expired`. Employee requests have no window and never expire here.
    /// Returns the number transitioned.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the request store lock is poisoned.
    pub fn expire_overdue(&self) -> ApprovalResult<usize> {
        let now = self.clock.now();
        let mut expired: usize = 0;
        self.requests.for_each_mut(|request| {
            let overdue = request
                .kind
                .window()
                .is_some_and(|window| now >= window.end);
            if overdue && request.status.allows_transition_to(&RequestStatus::Expired) {
                request.status = RequestStatus::Expired;
                request.version = request.version.saturating_add(1);
                expired = expired.saturating_add(1);
                tracing::info!(request = %request.id, "approved request expired");
            }
        })?;
        Ok(expired)
    }

    /// Get a request snapshot by ID.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn request(&self, request_id: &RequestId) -> ApprovalResult<Option<VisitRequest>> {
        self.requests.get(request_id)
    }

    fn check_decision_rights(
        &self,
        actor: &ActorId,
        request: &VisitRequest,
        action: &str,
    ) -> ApprovalResult<()> {
        let authorized = self
            .directory
            .resolve_role(actor)
            .is_some_and(|role| role.may_decide_for(&request.merchant));
        if authorized {
            Ok(())
        } else {
            Err(ApprovalError::NotAuthorized {
                actor: actor.to_string(),
                action: format!("{action} requests for merchant {}", request.merchant),
            })
        }
    }
}

fn check_version(request: &VisitRequest, expected: Option<u64>) -> ApprovalResult<()> {
    match expected {
        Some(expected) if expected != request.version => Err(ApprovalError::Conflict {
            request_id: request.id.to_string(),
            expected,
            actual: request.version,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
