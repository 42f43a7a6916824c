//! Submission gating for the final wizard step.
//!
//! Submission requires every required step complete, both confirmation
//! acknowledgements affirmatively checked, and a dossier still in draft.
//! Once any condition fails, no request may be dispatched at all.

use serde::{Deserialize, Serialize};

use crate::status::CandidatureStatus;
use crate::steps::{Progress, WizardStep};

/// The two mandatory acknowledgements on the validation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmations {
    /// The candidate attests the dossier's accuracy.
    pub exactitude: bool,
    /// The candidate acknowledges the dossier cannot change after submission.
    pub non_modification: bool,
}

impl Confirmations {
    pub fn all_checked(&self) -> bool {
        self.exactitude && self.non_modification
    }
}

/// Reasons submission is currently impossible, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "blocker")]
pub enum SubmissionBlocker {
    IncompleteSteps { missing: Vec<WizardStep> },
    MissingConfirmations,
    AlreadySubmitted,
}

/// Evaluate whether the submit action may dispatch.
pub fn check_submission(
    progress: &Progress,
    confirmations: &Confirmations,
    status: CandidatureStatus,
) -> Vec<SubmissionBlocker> {
    let mut blockers = Vec::new();

    if status != CandidatureStatus::Draft {
        blockers.push(SubmissionBlocker::AlreadySubmitted);
    }

    let missing = progress.missing_required();
    if !missing.is_empty() {
        blockers.push(SubmissionBlocker::IncompleteSteps { missing });
    }

    if !confirmations.all_checked() {
        blockers.push(SubmissionBlocker::MissingConfirmations);
    }

    blockers
}

/// True when nothing blocks submission.
pub fn can_submit(
    progress: &Progress,
    confirmations: &Confirmations,
    status: CandidatureStatus,
) -> bool {
    check_submission(progress, confirmations, status).is_empty()
}
