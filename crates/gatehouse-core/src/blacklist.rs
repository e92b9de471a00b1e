//! Blacklist collaborator.
//!
//! The building operator maintains a deny-list of people who may not
//! submit requests. The engine only consumes the yes/no answer; how the
//! list is maintained is someone else's problem.

use std::collections::HashSet;
use std::sync::RwLock;

/// Deny-list lookup consulted at request submission.
pub trait Blacklist: Send + Sync {
    /// Whether the given requester is barred from submitting requests.
    ///
    /// A match on either the name or the phone number counts.
    fn is_blacklisted(&self, name: &str, phone: &str) -> bool;
}

/// A blacklist that never matches. Useful default for tests and for
/// deployments without a deny-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlacklist;

impl Blacklist for NoBlacklist {
    fn is_blacklisted(&self, _name: &str, _phone: &str) -> bool {
        false
    }
}

/// An in-memory blacklist with explicit name and phone entries.
#[derive(Debug, Default)]
pub struct StaticBlacklist {
    names: RwLock<HashSet<String>>,
    phones: RwLock<HashSet<String>>,
}

impl StaticBlacklist {
    /// Create an empty blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bar a requester by name.
    pub fn ban_name(&self, name: impl Into<String>) {
        if let Ok(mut names) = self.names.write() {
            names.insert(name.into());
        }
    }

    /// Bar a requester by phone number.
    pub fn ban_phone(&self, phone: impl Into<String>) {
        if let Ok(mut phones) = self.phones.write() {
            phones.insert(phone.into());
        }
    }
}

impl Blacklist for StaticBlacklist {
    fn is_blacklisted(&self, name: &str, phone: &str) -> bool {
        let name_hit = self
            .names
            .read()
            .map(|names| names.contains(name))
            .unwrap_or(false);
        let phone_hit = self
            .phones
            .read()
            .map(|phones| phones.contains(phone))
            .unwrap_or(false);
        name_hit || phone_hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_blacklist_never_matches() {
        assert!(!NoBlacklist.is_blacklisted("Mallory", "13800000000"));
    }

    #[test]
    fn test_static_blacklist_by_name() {
        let list = StaticBlacklist::new();
        list.ban_name("Mallory");
        assert!(list.is_blacklisted("Mallory", "13900000000"));
        assert!(!list.is_blacklisted("Alice", "13900000000"));
    }

    #[test]
    fn test_static_blacklist_by_phone() {
        let list = StaticBlacklist::new();
        list.ban_phone("13800000000");
        assert!(list.is_blacklisted("Anyone", "13800000000"));
        assert!(!list.is_blacklisted("Anyone", "13811111111"));
    }
}
