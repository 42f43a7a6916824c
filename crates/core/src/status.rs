//! Candidature lifecycle status and lock semantics.
//!
//! Status transitions are monotonic: a dossier moves from `draft` to
//! `submitted` once, then only administrative outcomes follow. `blocked` is
//! an administrative hold, not a terminal state: an explicit unblock action
//! (external to this engine) may return the dossier to `draft`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Status values for a candidature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatureStatus {
    Draft,
    Submitted,
    Blocked,
    Approved,
    Rejected,
}

impl CandidatureStatus {
    /// Parse a status string from the backend.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "blocked" => Ok(Self::Blocked),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid candidature status '{s}'. Must be one of: draft, submitted, blocked, approved, rejected"
            ))),
        }
    }

    /// Convert to the backend string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Blocked => "blocked",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether `from → to` is a legal lifecycle transition.
    ///
    /// `Blocked → Draft` is the administrative unblock; it is legal here so
    /// that no caller treats `blocked` as terminal, even though this engine
    /// never initiates it.
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Draft, Self::Submitted)
                | (Self::Submitted, Self::Blocked)
                | (Self::Submitted, Self::Approved)
                | (Self::Submitted, Self::Rejected)
                | (Self::Blocked, Self::Draft)
                | (Self::Blocked, Self::Approved)
                | (Self::Blocked, Self::Rejected)
        )
    }

    /// Terminal administrative outcomes. `blocked` is deliberately excluded.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// The candidature's identity and lifecycle fields, as returned by the
/// status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatureHeader {
    pub id: DbId,
    pub user_id: DbId,
    /// Advisory cursor only; completion is tracked by the progress map.
    pub current_step: u8,
    pub status: CandidatureStatus,
    pub submitted_at: Option<Timestamp>,
    pub locked_at: Option<Timestamp>,
}

impl CandidatureHeader {
    /// A dossier is locked once `locked_at` is set, by submission or by
    /// deadline expiry.
    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }

    /// Candidate-facing mutation is allowed only on an unlocked draft.
    pub fn can_edit(&self) -> bool {
        self.status == CandidatureStatus::Draft && !self.is_locked()
    }

    /// Guard used by write paths: returns `CoreError::Locked` when the
    /// dossier no longer accepts candidate edits.
    pub fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.can_edit() {
            Ok(())
        } else if self.is_locked() {
            Err(CoreError::Locked(
                "Candidature is locked; no further edits are accepted".to_string(),
            ))
        } else {
            Err(CoreError::Locked(format!(
                "Candidature has status '{}' and is no longer editable",
                self.status.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use CandidatureStatus::*;

    fn header(status: CandidatureStatus, locked: bool) -> CandidatureHeader {
        CandidatureHeader {
            id: 1,
            user_id: 7,
            current_step: 1,
            status,
            submitted_at: None,
            locked_at: locked.then(chrono::Utc::now),
        }
    }

    #[test]
    fn status_from_str_roundtrip() {
        for status in [Draft, Submitted, Blocked, Approved, Rejected] {
            assert_eq!(
                CandidatureStatus::from_str_db(status.as_str()).unwrap(),
                status
            );
        }
    }

    #[test]
    fn status_from_str_invalid() {
        assert!(CandidatureStatus::from_str_db("pending").is_err());
        assert!(CandidatureStatus::from_str_db("").is_err());
    }

    #[test]
    fn draft_submits_once() {
        assert!(CandidatureStatus::can_transition(Draft, Submitted));
        assert!(!CandidatureStatus::can_transition(Submitted, Draft));
        assert!(!CandidatureStatus::can_transition(Draft, Approved));
    }

    #[test]
    fn submitted_reaches_administrative_outcomes() {
        assert!(CandidatureStatus::can_transition(Submitted, Blocked));
        assert!(CandidatureStatus::can_transition(Submitted, Approved));
        assert!(CandidatureStatus::can_transition(Submitted, Rejected));
    }

    #[test]
    fn blocked_is_recoverable() {
        assert!(CandidatureStatus::can_transition(Blocked, Draft));
        assert!(!Blocked.is_terminal());
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for to in [Draft, Submitted, Blocked, Approved, Rejected] {
            assert!(!CandidatureStatus::can_transition(Approved, to));
            assert!(!CandidatureStatus::can_transition(Rejected, to));
        }
        assert!(Approved.is_terminal());
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn draft_unlocked_is_editable() {
        assert!(header(Draft, false).can_edit());
        assert!(header(Draft, false).ensure_editable().is_ok());
    }

    #[test]
    fn locked_draft_rejects_edits() {
        let h = header(Draft, true);
        assert!(!h.can_edit());
        assert_matches!(h.ensure_editable(), Err(CoreError::Locked(_)));
    }

    #[test]
    fn submitted_rejects_edits_even_unlocked() {
        let h = header(Submitted, false);
        assert!(!h.can_edit());
        assert_matches!(h.ensure_editable(), Err(CoreError::Locked(_)));
    }

    #[test]
    fn blocked_is_not_editable_and_not_final() {
        let h = header(Blocked, false);
        assert!(!h.can_edit());
        assert!(!h.status.is_terminal());
    }
}
