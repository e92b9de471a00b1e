//! Read-side aggregation over the audit trail.

use gatehouse_approval::RequestStore;
use gatehouse_audit::{AccessRecord, AccessTrail};
use gatehouse_core::{CredentialId, RequestId, Timestamp};
use gatehouse_credential::CredentialStore;
use std::sync::Arc;

use crate::error::{GateError, GateResult};

/// What a history query is scoped to.
#[derive(Debug, Clone)]
pub enum HistoryKey {
    /// All records across every credential the request has owned.
    Request(RequestId),
    /// Records for one credential instance only.
    Credential(CredentialId),
}

/// Audit trail queries for the console and reporting layers.
pub struct AccessHistory {
    requests: Arc<RequestStore>,
    credentials: Arc<CredentialStore>,
    trail: Arc<dyn AccessTrail>,
}

impl AccessHistory {
    /// Wire up the query side over the shared stores.
    #[must_use]
    pub fn new(
        requests: Arc<RequestStore>,
        credentials: Arc<CredentialStore>,
        trail: Arc<dyn AccessTrail>,
    ) -> Self {
        Self {
            requests,
            credentials,
            trail,
        }
    }

    /// Records for a request or credential, ascending by timestamp,
    /// optionally bounded by an inclusive `[since, until]` range.
    ///
    /// An existing ID with no records returns an empty list; that is a
    /// valid answer, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NotFound`] if the ID itself does not exist,
    /// or a storage error from the underlying stores.
    pub fn history_for(
        &self,
        key: &HistoryKey,
        since: Option<Timestamp>,
        until: Option<Timestamp>,
    ) -> GateResult<Vec<AccessRecord>> {
        let records = match key {
            HistoryKey::Request(request_id) => {
                let exists = self
                    .requests
                    .get(request_id)
                    .map_err(|e| GateError::Storage(e.to_string()))?
                    .is_some();
                if !exists {
                    return Err(GateError::NotFound {
                        id: request_id.to_string(),
                    });
                }
                self.trail.for_request(request_id)?
            },
            HistoryKey::Credential(credential_id) => {
                let exists = self
                    .credentials
                    .get(credential_id)
                    .map_err(|e| GateError::Storage(e.to_string()))?
                    .is_some();
                if !exists {
                    return Err(GateError::NotFound {
                        id: credential_id.to_string(),
                    });
                }
                self.trail.for_credential(credential_id)?
            },
        };

        Ok(records
            .into_iter()
            .filter(|r| {
                since.is_none_or(|s| r.timestamp >= s) && until.is_none_or(|u| r.timestamp <= u)
            })
            .collect())
    }
}
