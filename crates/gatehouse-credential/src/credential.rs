//! The credential record and its usability derivation.

use gatehouse_core::{ActorId, CredentialId, Permission, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::code::AccessCode;

/// Stored credential status.
///
/// `Expired` here is a cache of the temporal fact, written by sweeps for
/// reporting convenience. Verification never trusts it: usability is
/// always re-derived from `expires_at` and the usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Issued and not revoked.
    Active,
    /// Marked expired by a sweep (the temporal fact holds regardless).
    Expired,
    /// Explicitly revoked; terminal.
    Revoked,
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// How many entries a credential is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageLimit {
    /// At most this many granted entries.
    Limited(u32),
    /// No bound on entries (employees, long-term contractors).
    Unlimited,
}

impl UsageLimit {
    /// Whether another entry is permitted after `used` granted entries.
    #[must_use]
    pub fn allows(self, used: u32) -> bool {
        match self {
            Self::Limited(limit) => used < limit,
            Self::Unlimited => true,
        }
    }
}

impl fmt::Display for UsageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Why and by whom a credential was revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// Staff member who revoked.
    pub actor: ActorId,
    /// Stated reason.
    pub reason: String,
    /// When the revocation happened.
    pub at: Timestamp,
}

/// Result of deriving whether a credential may be used right now.
///
/// Checked in precedence order: revocation first, then expiry, then
/// usage exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usability {
    /// May be used for an entry.
    Usable,
    /// Explicitly revoked.
    Revoked,
    /// Past its expiry instant.
    Expired,
    /// All permitted entries consumed.
    Exhausted,
}

impl Usability {
    /// Whether the credential may be used.
    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Usable)
    }
}

/// An issued, renewable, revocable access token bound to one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Stable identifier (survives refresh).
    pub id: CredentialId,
    /// The scannable code currently bound to this credential.
    pub code: AccessCode,
    /// The request this credential was minted for.
    pub request: RequestId,
    /// Cached status; see [`CredentialStatus`].
    pub status: CredentialStatus,
    /// When this credential (or its current code) was issued.
    pub issued_at: Timestamp,
    /// Instant after which the credential is logically expired.
    pub expires_at: Timestamp,
    /// Entry budget.
    pub usage_limit: UsageLimit,
    /// Granted entries so far. Exits never count.
    pub usage_count: u32,
    /// Capabilities granted by the approver.
    pub permissions: BTreeSet<Permission>,
    /// Present iff the credential was revoked.
    pub revocation: Option<Revocation>,
    /// Optimistic-concurrency counter, bumped on every mutation.
    pub version: u64,
}

impl Credential {
    /// Derive usability at `now`.
    ///
    /// Never consults the cached `status` for expiry: a credential whose
    /// `expires_at` has passed is expired even if no sweep marked it so.
    #[must_use]
    pub fn usability(&self, now: Timestamp) -> Usability {
        if self.status == CredentialStatus::Revoked {
            return Usability::Revoked;
        }
        if now >= self.expires_at {
            return Usability::Expired;
        }
        if !self.usage_limit.allows(self.usage_count) {
            return Usability::Exhausted;
        }
        Usability::Usable
    }

    /// Whether the credential may be used for an entry at `now`.
    #[must_use]
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.usability(now).is_usable()
    }

    /// Whether entry requires a confirmed escort.
    #[must_use]
    pub fn requires_escort(&self) -> bool {
        self.permissions.contains(&Permission::EscortRequired)
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Credential {}
