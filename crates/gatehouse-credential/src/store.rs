//! In-memory credential store.
//!
//! Thread-safe via a single internal [`RwLock`]; every compound
//! check-and-mutate operation (notably [`CredentialStore::authorize_entry`])
//! runs under one write lock so two gates racing on the same code at the
//! usage-limit boundary cannot both succeed.

use gatehouse_core::{ActorId, CredentialId, Permission, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::RwLock;

use crate::code::AccessCode;
use crate::credential::{Credential, CredentialStatus, Revocation, Usability, UsageLimit};
use crate::error::{CredentialError, CredentialResult};

/// Parameters for minting a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueParams {
    /// Instant after which the credential is expired. Must be strictly
    /// after issuance time.
    pub expires_at: Timestamp,
    /// Entry budget.
    pub usage_limit: UsageLimit,
    /// Capabilities granted by the approver.
    pub permissions: BTreeSet<Permission>,
}

/// Why an entry was refused at the store level.
///
/// Ordered by check precedence: revoked, expired, exhausted, escort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDenial {
    /// Credential was explicitly revoked.
    Revoked,
    /// Credential is past its expiry instant.
    Expired,
    /// All permitted entries consumed.
    UsageExhausted,
    /// Credential requires an escort and none was confirmed.
    EscortRequired,
}

/// Outcome of an atomic entry authorization.
#[derive(Debug, Clone)]
pub enum EntryDecision {
    /// Entry granted; one use was consumed. Snapshot taken after the
    /// increment.
    Granted {
        /// The credential as stored after consumption.
        credential: Credential,
    },
    /// Entry refused; nothing was consumed.
    Denied {
        /// The most specific applicable reason.
        reason: EntryDenial,
        /// Snapshot of the credential that was refused.
        credential: Credential,
    },
    /// The presented code resolves to no credential.
    UnknownCode,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<CredentialId, Credential>,
    /// Maps live codes to credentials. Superseded codes are removed and
    /// become permanently unresolvable.
    code_index: HashMap<AccessCode, CredentialId>,
    /// The currently relevant credential per request, if any.
    request_index: HashMap<RequestId, CredentialId>,
}

/// In-memory store for credentials.
pub struct CredentialStore {
    inner: RwLock<Inner>,
}

impl CredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Mint a credential for a request.
    ///
    /// If the request already owns a credential, the old one is
    /// superseded: its code is removed from the index and will fail
    /// verification as unknown, while its access records remain valid
    /// audit entries.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Validation`] if `expires_at` is not
    /// strictly after `now`, or a storage error if the lock is poisoned.
    pub fn issue(
        &self,
        request: RequestId,
        params: IssueParams,
        now: Timestamp,
    ) -> CredentialResult<Credential> {
        if params.expires_at <= now {
            return Err(CredentialError::Validation {
                message: format!(
                    "expires_at ({}) must be strictly after issuance time ({now})",
                    params.expires_at
                ),
            });
        }

        let credential = Credential {
            id: CredentialId::new(),
            code: AccessCode::generate(),
            request: request.clone(),
            status: CredentialStatus::Active,
            issued_at: now,
            expires_at: params.expires_at,
            usage_limit: params.usage_limit,
            usage_count: 0,
            permissions: params.permissions,
            revocation: None,
            version: 0,
        };

        let mut guard = self.write()?;
        let inner = &mut *guard;

        // Supersede any previous credential for this request.
        if let Some(previous_id) = inner.request_index.get(&request).cloned()
            && let Some(previous) = inner.by_id.get(&previous_id)
        {
            let stale_code = previous.code.clone();
            inner.code_index.remove(&stale_code);
            tracing::debug!(
                credential = %previous_id,
                request = %request,
                "superseded previous credential"
            );
        }

        inner
            .code_index
            .insert(credential.code.clone(), credential.id.clone());
        inner
            .request_index
            .insert(request, credential.id.clone());
        inner.by_id.insert(credential.id.clone(), credential.clone());

        tracing::info!(credential = %credential.id, request = %credential.request, "issued credential");
        Ok(credential)
    }

    /// Re-key a credential: same bounds and permissions, a fresh code,
    /// usage count reset to zero.
    ///
    /// The prior code fails verification immediately; there is no grace
    /// period. Used after a suspected leak or on explicit staff action.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] for an unknown ID,
    /// [`CredentialError::InvalidState`] if the credential is not active,
    /// or [`CredentialError::Conflict`] on an expected-version mismatch.
    pub fn refresh(
        &self,
        credential_id: &CredentialId,
        expected_version: Option<u64>,
        now: Timestamp,
    ) -> CredentialResult<Credential> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        let credential =
            inner
                .by_id
                .get(credential_id)
                .ok_or_else(|| CredentialError::NotFound {
                    credential_id: credential_id.to_string(),
                })?;

        check_version(credential, expected_version)?;
        if credential.status != CredentialStatus::Active {
            return Err(CredentialError::InvalidState {
                credential_id: credential_id.to_string(),
                status: credential.status,
            });
        }

        let stale_code = credential.code.clone();
        let fresh_code = AccessCode::generate();

        inner.code_index.remove(&stale_code);
        inner
            .code_index
            .insert(fresh_code.clone(), credential_id.clone());

        // Borrow again mutably now that the index is updated.
        let credential = inner.by_id.get_mut(credential_id).ok_or_else(|| {
            CredentialError::Storage("credential vanished during refresh".to_string())
        })?;
        credential.code = fresh_code;
        credential.usage_count = 0;
        credential.issued_at = now;
        credential.version = credential.version.saturating_add(1);

        tracing::info!(credential = %credential_id, "refreshed credential code");
        Ok(credential.clone())
    }

    /// Revoke a credential.
    ///
    /// Idempotent: revoking an already-revoked credential succeeds
    /// without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] for an unknown ID or
    /// [`CredentialError::Conflict`] on an expected-version mismatch.
    pub fn revoke(
        &self,
        credential_id: &CredentialId,
        actor: ActorId,
        reason: impl Into<String>,
        expected_version: Option<u64>,
        now: Timestamp,
    ) -> CredentialResult<Credential> {
        let mut inner = self.write()?;

        let credential =
            inner
                .by_id
                .get_mut(credential_id)
                .ok_or_else(|| CredentialError::NotFound {
                    credential_id: credential_id.to_string(),
                })?;

        if credential.status == CredentialStatus::Revoked {
            // Already revoked: no-op success, no version bump.
            return Ok(credential.clone());
        }

        check_version(credential, expected_version)?;

        credential.status = CredentialStatus::Revoked;
        credential.revocation = Some(Revocation {
            actor,
            reason: reason.into(),
            at: now,
        });
        credential.version = credential.version.saturating_add(1);

        tracing::info!(credential = %credential_id, "revoked credential");
        Ok(credential.clone())
    }

    /// Resolve a presented code to a credential snapshot.
    ///
    /// Superseded codes do not resolve; revoked and expired credentials
    /// do (the gate needs them to produce specific denial reasons).
    #[must_use]
    pub fn resolve(&self, code: &AccessCode) -> Option<Credential> {
        let inner = self.read().ok()?;
        let id = inner.code_index.get(code)?;
        inner.by_id.get(id).cloned()
    }

    /// Get a credential by ID.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn get(&self, credential_id: &CredentialId) -> CredentialResult<Option<Credential>> {
        Ok(self.read()?.by_id.get(credential_id).cloned())
    }

    /// The currently relevant credential for a request, if any.
    #[must_use]
    pub fn current_for_request(&self, request: &RequestId) -> Option<Credential> {
        let inner = self.read().ok()?;
        let id = inner.request_index.get(request)?;
        inner.by_id.get(id).cloned()
    }

    /// Atomically authorize one entry against a presented code.
    ///
    /// Resolution, usability derivation, the escort check and the usage
    /// increment all happen under a single write lock: at a credential
    /// sitting one entry below its limit, exactly one of two concurrent
    /// calls is granted.
    ///
    /// Denials consume nothing. Checks run in precedence order:
    /// revoked, expired, usage-exhausted, escort-required.
    #[must_use]
    pub fn authorize_entry(
        &self,
        code: &AccessCode,
        now: Timestamp,
        escort_confirmed: bool,
    ) -> EntryDecision {
        let Ok(mut inner) = self.inner.write() else {
            // A poisoned lock means a writer panicked mid-operation; the
            // gate treats the code as unresolvable rather than guessing.
            tracing::warn!("credential store lock poisoned during entry authorization");
            return EntryDecision::UnknownCode;
        };

        let Some(id) = inner.code_index.get(code).cloned() else {
            return EntryDecision::UnknownCode;
        };
        let Some(credential) = inner.by_id.get_mut(&id) else {
            return EntryDecision::UnknownCode;
        };

        let denial = match credential.usability(now) {
            Usability::Revoked => Some(EntryDenial::Revoked),
            Usability::Expired => Some(EntryDenial::Expired),
            Usability::Exhausted => Some(EntryDenial::UsageExhausted),
            Usability::Usable => {
                if credential.requires_escort() && !escort_confirmed {
                    Some(EntryDenial::EscortRequired)
                } else {
                    None
                }
            },
        };

        if let Some(reason) = denial {
            return EntryDecision::Denied {
                reason,
                credential: credential.clone(),
            };
        }

        credential.usage_count = credential.usage_count.saturating_add(1);
        credential.version = credential.version.saturating_add(1);
        EntryDecision::Granted {
            credential: credential.clone(),
        }
    }

    /// Mark credentials past their expiry as `Expired` (status cache
    /// sweep). Returns the number updated.
    ///
    /// Verification correctness never depends on this running; it only
    /// keeps reporting queries honest.
    pub fn sweep_expired(&self, now: Timestamp) -> usize {
        let Ok(mut inner) = self.inner.write() else {
            return 0;
        };
        let mut swept: usize = 0;
        for credential in inner.by_id.values_mut() {
            if credential.status == CredentialStatus::Active && now >= credential.expires_at {
                credential.status = CredentialStatus::Expired;
                credential.version = credential.version.saturating_add(1);
                swept = swept.saturating_add(1);
            }
        }
        swept
    }

    /// Number of credentials in the store (all statuses).
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().map(|inner| inner.by_id.len()).unwrap_or(0)
    }

    fn read(&self) -> CredentialResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| CredentialError::Storage(e.to_string()))
    }

    fn write(&self) -> CredentialResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| CredentialError::Storage(e.to_string()))
    }
}

fn check_version(credential: &Credential, expected: Option<u64>) -> CredentialResult<()> {
    match expected {
        Some(expected) if expected != credential.version => Err(CredentialError::Conflict {
            credential_id: credential.id.to_string(),
            expected,
            actual: credential.version,
        }),
        _ => Ok(()),
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
