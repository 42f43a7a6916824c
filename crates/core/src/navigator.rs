//! Guarded navigation across the wizard.
//!
//! Backward movement is always free; moving forward requires every required
//! step strictly before the target to be complete. The guard never mutates
//! state and must be re-evaluated against the latest known progress on every
//! attempt.

use serde::Serialize;

use crate::steps::{Progress, WizardStep};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum NavigationDecision {
    Allowed,
    /// Denied, with the incomplete required steps in step order so the
    /// caller can present an actionable message.
    Blocked { missing: Vec<WizardStep> },
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decide whether navigation from `current` to `target` is permitted given
/// the authoritative progress map.
pub fn check_navigation(
    target: WizardStep,
    current: WizardStep,
    progress: &Progress,
) -> NavigationDecision {
    // Revisiting or re-editing an earlier step is always allowed.
    if target.to_number() <= current.to_number() {
        return NavigationDecision::Allowed;
    }

    let missing: Vec<WizardStep> = progress
        .missing_required()
        .into_iter()
        .filter(|s| s.to_number() < target.to_number())
        .collect();

    if missing.is_empty() {
        NavigationDecision::Allowed
    } else {
        NavigationDecision::Blocked { missing }
    }
}
