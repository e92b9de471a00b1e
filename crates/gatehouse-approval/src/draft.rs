//! Unvalidated request input.

use gatehouse_core::{MerchantId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::FieldViolation;
use crate::request::{RequestKind, RequesterInfo};

/// What a requester submits before any validation has run.
///
/// Validation reports every violated field at once so a form can be
/// corrected in one pass instead of one error per round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDraft {
    /// Requester identity and contact details.
    pub requester: RequesterInfo,
    /// The merchant being visited or joined.
    pub merchant: MerchantId,
    /// Named contact or escort person at the merchant, if any.
    pub contact: Option<String>,
    /// Stated purpose.
    pub purpose: String,
    /// Visitor-with-window or employee enrollment.
    pub kind: RequestKind,
}

impl RequestDraft {
    /// Validate the draft against `now`.
    ///
    /// # Errors
    ///
    /// Returns every [`FieldViolation`] found. Employee drafts skip the
    /// window checks entirely.
    pub fn validate(&self, now: Timestamp) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if self.requester.name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "must not be empty"));
        }
        if self.requester.phone.trim().is_empty() {
            violations.push(FieldViolation::new("phone", "must not be empty"));
        }
        if self.purpose.trim().is_empty() {
            violations.push(FieldViolation::new("purpose", "must not be empty"));
        }
        if self.merchant.as_str().trim().is_empty() {
            violations.push(FieldViolation::new("merchant", "must not be empty"));
        }

        if let Some(window) = self.kind.window() {
            if window.end < window.start {
                violations.push(FieldViolation::new(
                    "window.end",
                    format!("must not be before window.start ({})", window.start),
                ));
            }
            if window.start < now {
                violations.push(FieldViolation::new(
                    "window.start",
                    format!("must not be in the past (now is {now})"),
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
