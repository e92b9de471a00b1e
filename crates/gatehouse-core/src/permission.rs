//! Permissions and access levels carried by credentials.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named capability attached to a credential.
///
/// The set on a credential is unordered; [`BTreeSet`] is used purely for
/// stable iteration and serialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Ordinary access to public areas of the building.
    Standard,
    /// Entry requires an accompanying staff member to be confirmed at
    /// the gate. Exit is never blocked by this.
    EscortRequired,
    /// Access to a named restricted area.
    Area(String),
}

impl Permission {
    /// Access to the restricted area with the given name.
    pub fn area(name: impl Into<String>) -> Self {
        Self::Area(name.into())
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::EscortRequired => write!(f, "escort-required"),
            Self::Area(name) => write!(f, "area:{name}"),
        }
    }
}

/// Coarse access tier chosen by the approver.
///
/// Expands into a base permission set; approvers may add further
/// [`Permission`]s on top of the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Unaccompanied access to public areas.
    Standard,
    /// Visitor must be escorted by the contact person.
    Escorted,
}

impl AccessLevel {
    /// The permissions implied by this level.
    #[must_use]
    pub fn base_permissions(self) -> BTreeSet<Permission> {
        match self {
            Self::Standard => BTreeSet::from([Permission::Standard]),
            Self::Escorted => {
                BTreeSet::from([Permission::Standard, Permission::EscortRequired])
            },
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Escorted => write!(f, "escorted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_display() {
        assert_eq!(Permission::Standard.to_string(), "standard");
        assert_eq!(Permission::EscortRequired.to_string(), "escort-required");
        assert_eq!(Permission::area("lab-3").to_string(), "area:lab-3");
    }

    #[test]
    fn test_access_level_expansion() {
        let standard = AccessLevel::Standard.base_permissions();
        assert!(standard.contains(&Permission::Standard));
        assert!(!standard.contains(&Permission::EscortRequired));

        let escorted = AccessLevel::Escorted.base_permissions();
        assert!(escorted.contains(&Permission::EscortRequired));
    }

    #[test]
    fn test_permission_set_is_unordered() {
        let a = BTreeSet::from([Permission::Standard, Permission::area("lab-3")]);
        let b = BTreeSet::from([Permission::area("lab-3"), Permission::Standard]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_permission_serde_roundtrip() {
        let perms = BTreeSet::from([
            Permission::Standard,
            Permission::EscortRequired,
            Permission::area("server-room"),
        ]);
        let json = serde_json::to_string(&perms).unwrap();
        let back: BTreeSet<Permission> = serde_json::from_str(&json).unwrap();
        assert_eq!(perms, back);
    }
}
