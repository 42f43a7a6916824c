//! Wizard step definitions and the server-authoritative progress map.
//!
//! Step completion is decided server-side from submitted data; the client
//! only reads the `progress` payload back. Unknown steps default to
//! incomplete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The six steps of the candidature wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Profil,
    Enseignements,
    Pfe,
    ActivitesEnseignement,
    ActivitesRecherche,
    Validation,
}

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 6;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 6;

/// Steps that must be complete before submission. The validation step is
/// terminal and has no completion flag of its own.
pub const REQUIRED_STEPS: [WizardStep; 5] = [
    WizardStep::Profil,
    WizardStep::Enseignements,
    WizardStep::Pfe,
    WizardStep::ActivitesEnseignement,
    WizardStep::ActivitesRecherche,
];

impl WizardStep {
    /// Convert a 1-based step number to a `WizardStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Profil),
            2 => Ok(Self::Enseignements),
            3 => Ok(Self::Pfe),
            4 => Ok(Self::ActivitesEnseignement),
            5 => Ok(Self::ActivitesRecherche),
            6 => Ok(Self::Validation),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Profil => 1,
            Self::Enseignements => 2,
            Self::Pfe => 3,
            Self::ActivitesEnseignement => 4,
            Self::ActivitesRecherche => 5,
            Self::Validation => 6,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Profil => "Profil",
            Self::Enseignements => "Enseignements",
            Self::Pfe => "PFE",
            Self::ActivitesEnseignement => "Activités Enseignement",
            Self::ActivitesRecherche => "Activités Recherche",
            Self::Validation => "Validation",
        }
    }

    /// Whether the step must be complete before submission.
    pub fn is_required(self) -> bool {
        self != Self::Validation
    }
}

/// Server-authoritative progress payload: per-step completion keyed by the
/// step number as a string, plus derived counters for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    pub steps: BTreeMap<String, bool>,
    pub completed: u8,
    pub total: u8,
    pub percent: f64,
}

impl Progress {
    /// Build a progress payload from explicit step completion, deriving the
    /// counters the same way the backend does.
    pub fn from_completed<I: IntoIterator<Item = (WizardStep, bool)>>(entries: I) -> Self {
        let steps: BTreeMap<String, bool> = entries
            .into_iter()
            .map(|(step, done)| (step.to_number().to_string(), done))
            .collect();
        let total = REQUIRED_STEPS.len() as u8;
        let completed = REQUIRED_STEPS
            .iter()
            .filter(|s| steps.get(&s.to_number().to_string()).copied().unwrap_or(false))
            .count() as u8;
        let percent = if total == 0 {
            0.0
        } else {
            f64::from(completed) / f64::from(total) * 100.0
        };
        Self {
            steps,
            completed,
            total,
            percent,
        }
    }

    /// Whether a step is marked complete. Unknown steps are incomplete.
    pub fn is_step_complete(&self, step: WizardStep) -> bool {
        self.steps
            .get(&step.to_number().to_string())
            .copied()
            .unwrap_or(false)
    }

    /// Required steps that are still incomplete, in step order.
    pub fn missing_required(&self) -> Vec<WizardStep> {
        REQUIRED_STEPS
            .iter()
            .copied()
            .filter(|s| !self.is_step_complete(*s))
            .collect()
    }

    /// True when every required step is complete.
    pub fn all_required_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}
