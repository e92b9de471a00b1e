//! Identity/role collaborator.
//!
//! Authorization checks in the approval workflow resolve an [`ActorId`]
//! to a role through this trait. Session issuance and authentication are
//! external; the engine only sees the resolved role.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{ActorId, MerchantId};

/// The role an actor holds within the building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum ActorRole {
    /// May approve/reject requests targeting one specific merchant.
    MerchantApprover {
        /// The merchant this approver is scoped to.
        merchant: MerchantId,
    },
    /// Front-desk or security staff; operates the verification gate but
    /// decides no requests.
    FrontDesk,
    /// Building administrator; may decide requests for any merchant.
    BuildingAdmin,
}

impl ActorRole {
    /// Whether this role may approve or reject requests for `merchant`.
    #[must_use]
    pub fn may_decide_for(&self, merchant: &MerchantId) -> bool {
        match self {
            Self::MerchantApprover { merchant: scoped } => scoped == merchant,
            Self::BuildingAdmin => true,
            Self::FrontDesk => false,
        }
    }
}

/// Resolves actor identities to roles.
pub trait ActorDirectory: Send + Sync {
    /// Look up the role for an actor, or `None` for unknown actors.
    fn resolve_role(&self, actor: &ActorId) -> Option<ActorRole>;
}

/// In-memory directory with explicitly registered actors.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    roles: RwLock<HashMap<ActorId, ActorRole>>,
}

impl StaticDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an actor's role.
    pub fn register(&self, actor: ActorId, role: ActorRole) {
        if let Ok(mut roles) = self.roles.write() {
            roles.insert(actor, role);
        }
    }
}

impl ActorDirectory for StaticDirectory {
    fn resolve_role(&self, actor: &ActorId) -> Option<ActorRole> {
        self.roles
            .read()
            .ok()
            .and_then(|roles| roles.get(actor).cloned())
    }
}
