//! Trail storage trait and in-memory implementation.

use gatehouse_core::{CredentialId, RequestId, Timestamp};
use std::collections::HashSet;
use std::fmt;
use std::sync::RwLock;

use crate::error::{AuditError, AuditResult};
use crate::record::{AccessRecord, GateEvent};

/// Storage backend for the access trail.
///
/// Implementations must be thread-safe and strictly append-only: there
/// is deliberately no update or delete operation. Query results are
/// ordered by timestamp ascending (ties by insertion order).
pub trait AccessTrail: Send + Sync {
    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn append(&self, record: AccessRecord) -> AuditResult<()>;

    /// All records for a credential, in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    fn for_credential(&self, credential: &CredentialId) -> AuditResult<Vec<AccessRecord>>;

    /// All records for a request (across every credential it has owned),
    /// in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    fn for_request(&self, request: &RequestId) -> AuditResult<Vec<AccessRecord>>;

    /// Records within an inclusive time range, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    fn in_range(
        &self,
        since: Option<Timestamp>,
        until: Option<Timestamp>,
    ) -> AuditResult<Vec<AccessRecord>>;

    /// The most recent granted entry for a credential that no exit has
    /// closed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    fn last_unmatched_entry(
        &self,
        credential: &CredentialId,
    ) -> AuditResult<Option<AccessRecord>>;

    /// Total number of records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    fn count(&self) -> AuditResult<usize>;
}

/// Seconds between a granted entry and its exit.
///
/// # Errors
///
/// Returns [`AuditError::InvalidPair`] if the records reference
/// different credentials, are not an entry/exit pair, or the exit
/// precedes the entry.
pub fn compute_duration(
    entry: &AccessRecord,
    exit: &AccessRecord,
) -> AuditResult<chrono::Duration> {
    if entry.event != GateEvent::Entry || exit.event != GateEvent::Exit {
        return Err(AuditError::InvalidPair {
            message: format!(
                "expected an entry/exit pair, got {}/{}",
                entry.event, exit.event
            ),
        });
    }
    match (
        entry.credential.credential_id(),
        exit.credential.credential_id(),
    ) {
        (Some(a), Some(b)) if a == b => {},
        _ => {
            return Err(AuditError::InvalidPair {
                message: "records reference different credentials".to_string(),
            });
        },
    }
    if exit.timestamp < entry.timestamp {
        return Err(AuditError::InvalidPair {
            message: format!(
                "exit ({}) precedes entry ({})",
                exit.timestamp, entry.timestamp
            ),
        });
    }
    Ok(exit.timestamp.since(entry.timestamp))
}

/// In-memory, append-only trail.
///
/// Records are held in insertion order; the store hands out clones and
/// exposes no way to modify what was written.
#[derive(Default)]
pub struct MemoryAccessTrail {
    records: RwLock<Vec<AccessRecord>>,
}

impl MemoryAccessTrail {
    /// Create an empty trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn collect<F>(&self, mut keep: F) -> AuditResult<Vec<AccessRecord>>
    where
        F: FnMut(&AccessRecord) -> bool,
    {
        let records = self
            .records
            .read()
            .map_err(|e| AuditError::Storage(e.to_string()))?;
        let mut matched: Vec<AccessRecord> =
            records.iter().filter(|r| keep(r)).cloned().collect();
        // Insertion order already is time order for a live gate, but
        // backfilled records may arrive late.
        matched.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(matched)
    }
}

impl AccessTrail for MemoryAccessTrail {
    fn append(&self, record: AccessRecord) -> AuditResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| AuditError::Storage(e.to_string()))?;
        tracing::debug!(record = %record.id, event = %record.event, outcome = %record.outcome, "trail append");
        records.push(record);
        Ok(())
    }

    fn for_credential(&self, credential: &CredentialId) -> AuditResult<Vec<AccessRecord>> {
        self.collect(|r| r.credential.credential_id() == Some(credential))
    }

    fn for_request(&self, request: &RequestId) -> AuditResult<Vec<AccessRecord>> {
        self.collect(|r| r.request.as_ref() == Some(request))
    }

    fn in_range(
        &self,
        since: Option<Timestamp>,
        until: Option<Timestamp>,
    ) -> AuditResult<Vec<AccessRecord>> {
        self.collect(|r| {
            since.is_none_or(|s| r.timestamp >= s) && until.is_none_or(|u| r.timestamp <= u)
        })
    }

    fn last_unmatched_entry(
        &self,
        credential: &CredentialId,
    ) -> AuditResult<Option<AccessRecord>> {
        let history = self.for_credential(credential)?;

        // Entry IDs already closed by some exit.
        let closed: HashSet<_> = history
            .iter()
            .filter(|r| r.event == GateEvent::Exit)
            .filter_map(|r| r.matched_entry.clone())
            .collect();

        Ok(history
            .into_iter()
            .rev()
            .find(|r| {
                r.event == GateEvent::Entry
                    && r.outcome.is_granted()
                    && !closed.contains(&r.id)
            }))
    }

    fn count(&self) -> AuditResult<usize> {
        Ok(self
            .records
            .read()
            .map_err(|e| AuditError::Storage(e.to_string()))?
            .len())
    }
}

impl fmt::Debug for MemoryAccessTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.records.read().map(|r| r.len()).unwrap_or(0);
        f.debug_struct("MemoryAccessTrail")
            .field("count", &count)
            .finish()
    }
}
