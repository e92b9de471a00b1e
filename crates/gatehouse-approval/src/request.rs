//! The visit/enrollment request entity and its state machine.

use gatehouse_core::{ActorId, MerchantId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is asking for access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterInfo {
    /// Full name.
    pub name: String,
    /// Contact phone; also serves as the withdrawal token.
    pub phone: String,
    /// Government ID document number, if collected.
    pub id_document: Option<String>,
    /// Employer or organization, if stated.
    pub company: Option<String>,
}

/// The requested visit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitWindow {
    /// Earliest intended arrival.
    pub start: Timestamp,
    /// Latest intended departure.
    pub end: Timestamp,
}

/// Visitor versus employee enrollment.
///
/// Employees have standing access and therefore no visit window; their
/// requests never expire on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RequestKind {
    /// A one-off visit within a stated window.
    Visitor {
        /// The requested window.
        window: VisitWindow,
    },
    /// An employee-enrollment request with no window.
    Employee,
}

impl RequestKind {
    /// The visit window, for visitor requests.
    #[must_use]
    pub fn window(&self) -> Option<&VisitWindow> {
        match self {
            Self::Visitor { window } => Some(window),
            Self::Employee => None,
        }
    }
}

/// Metadata recorded when an actor decides a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Who decided.
    pub actor: ActorId,
    /// Approval notes or rejection reason.
    pub notes: String,
    /// When the decision was made.
    pub at: Timestamp,
}

/// Request lifecycle status. Decision metadata lives inside the variant
/// that produced it, so a decided request cannot lack it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; a credential was minted.
    Approved {
        /// Who approved, with notes and timestamp.
        decision: Decision,
    },
    /// Rejected with a mandatory reason.
    Rejected {
        /// Who rejected and why.
        decision: Decision,
    },
    /// The approved visit window elapsed without further action.
    Expired,
    /// Withdrawn by the requester before any decision.
    Withdrawn {
        /// When it was withdrawn.
        at: Timestamp,
    },
}

impl RequestStatus {
    /// Whether a transition from this status into `next` is legal.
    ///
    /// Transitions are monotonic: only `Pending` can be decided or
    /// withdrawn, only `Approved` can lapse into `Expired`, and nothing
    /// ever re-enters `Pending`.
    #[must_use]
    pub fn allows_transition_to(&self, next: &RequestStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Approved { .. })
            | (Self::Pending, Self::Rejected { .. })
            | (Self::Pending, Self::Withdrawn { .. })
            | (Self::Approved { .. }, Self::Expired) => true,
            (Self::Pending, Self::Pending | Self::Expired)
            | (Self::Approved { .. }, _)
            | (Self::Rejected { .. }, _)
            | (Self::Expired, _)
            | (Self::Withdrawn { .. }, _) => false,
        }
    }

    /// Whether the request is still awaiting a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved { .. } => write!(f, "approved"),
            Self::Rejected { .. } => write!(f, "rejected"),
            Self::Expired => write!(f, "expired"),
            Self::Withdrawn { .. } => write!(f, "withdrawn"),
        }
    }
}

/// A visitor application or employee-enrollment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// Who is asking.
    pub requester: RequesterInfo,
    /// The merchant (tenant) being visited or joined.
    pub merchant: MerchantId,
    /// Named contact or escort person at the merchant, if any.
    pub contact: Option<String>,
    /// Stated purpose of the visit or enrollment.
    pub purpose: String,
    /// Visitor-with-window or employee.
    pub kind: RequestKind,
    /// Lifecycle status with embedded decision metadata.
    pub status: RequestStatus,
    /// When the request was submitted.
    pub submitted_at: Timestamp,
    /// Optimistic-concurrency counter, bumped on every mutation.
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn decision() -> Decision {
        Decision {
            actor: ActorId::new("alice"),
            notes: "ok".to_string(),
            at: Timestamp::now(),
        }
    }

    #[test]
    fn test_pending_can_be_decided() {
        let pending = RequestStatus::Pending;
        assert!(pending.allows_transition_to(&RequestStatus::Approved {
            decision: decision()
        }));
        assert!(pending.allows_transition_to(&RequestStatus::Rejected {
            decision: decision()
        }));
        assert!(pending.allows_transition_to(&RequestStatus::Withdrawn {
            at: Timestamp::now()
        }));
        assert!(!pending.allows_transition_to(&RequestStatus::Expired));
    }

    #[test]
    fn test_only_approved_expires() {
        let approved = RequestStatus::Approved {
            decision: decision(),
        };
        assert!(approved.allows_transition_to(&RequestStatus::Expired));

        let rejected = RequestStatus::Rejected {
            decision: decision(),
        };
        assert!(!rejected.allows_transition_to(&RequestStatus::Expired));
    }

    #[test]
    fn test_terminal_states_stay_terminal() {
        for terminal in [
            RequestStatus::Rejected {
                decision: decision(),
            },
            RequestStatus::Expired,
            RequestStatus::Withdrawn {
                at: Timestamp::now(),
            },
        ] {
            assert!(!terminal.allows_transition_to(&RequestStatus::Pending));
            assert!(!terminal.allows_transition_to(&RequestStatus::Approved {
                decision: decision()
            }));
        }
    }

    #[test]
    fn test_nothing_reenters_pending() {
        let approved = RequestStatus::Approved {
            decision: decision(),
        };
        assert!(!approved.allows_transition_to(&RequestStatus::Pending));
    }

    #[test]
    fn test_employee_has_no_window() {
        assert!(RequestKind::Employee.window().is_none());

        let start = Timestamp::now();
        let visitor = RequestKind::Visitor {
            window: VisitWindow {
                start,
                end: start.plus(Duration::hours(2)),
            },
        };
        assert!(visitor.window().is_some());
    }

    #[test]
    fn test_status_serde_tags() {
        let json = serde_json::to_string(&RequestStatus::Pending).unwrap();
        assert!(json.contains("\"status\":\"pending\""));
    }
}
