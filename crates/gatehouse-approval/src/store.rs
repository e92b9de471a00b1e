//! In-memory request store.

use gatehouse_core::RequestId;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use crate::error::{ApprovalError, ApprovalResult};
use crate::request::VisitRequest;

/// Thread-safe in-memory store for requests.
///
/// Compound check-and-mutate operations go through [`RequestStore::modify`]
/// so the check and the write happen under one lock.
#[derive(Default)]
pub struct RequestStore {
    requests: RwLock<HashMap<RequestId, VisitRequest>>,
}

impl RequestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly submitted request.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn insert(&self, request: VisitRequest) -> ApprovalResult<()> {
        let mut requests = self.write()?;
        requests.insert(request.id.clone(), request);
        Ok(())
    }

    /// Get a request snapshot by ID.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn get(&self, request_id: &RequestId) -> ApprovalResult<Option<VisitRequest>> {
        Ok(self.read()?.get(request_id).cloned())
    }

    /// Run a check-and-mutate operation against one request under the
    /// write lock. The closure's error aborts the mutation (the map
    /// entry keeps whatever state the closure left it in, so closures
    /// must mutate only after all checks pass).
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown ID, a storage
    /// error if the lock is poisoned, or whatever the closure returns.
    pub fn modify<T>(
        &self,
        request_id: &RequestId,
        op: impl FnOnce(&mut VisitRequest) -> ApprovalResult<T>,
    ) -> ApprovalResult<T> {
        let mut requests = self.write()?;
        let request = requests
            .get_mut(request_id)
            .ok_or_else(|| ApprovalError::NotFound {
                request_id: request_id.to_string(),
            })?;
        op(request)
    }

    /// Visit every request mutably under one write lock. Used by the
    /// expiry sweep.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn for_each_mut(
        &self,
        mut op: impl FnMut(&mut VisitRequest),
    ) -> ApprovalResult<()> {
        let mut requests = self.write()?;
        for request in requests.values_mut() {
            op(request);
        }
        Ok(())
    }

    /// Number of stored requests (all statuses).
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().map(|requests| requests.len()).unwrap_or(0)
    }

    fn read(
        &self,
    ) -> ApprovalResult<std::sync::RwLockReadGuard<'_, HashMap<RequestId, VisitRequest>>> {
        self.requests
            .read()
            .map_err(|e| ApprovalError::Storage(e.to_string()))
    }

    fn write(
        &self,
    ) -> ApprovalResult<std::sync::RwLockWriteGuard<'_, HashMap<RequestId, VisitRequest>>> {
        self.requests
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))
    }
}

impl fmt::Debug for RequestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestStore")
            .field("count", &self.count())
            .finish()
    }
}
