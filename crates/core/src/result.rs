//! Président-authored final result: audition score, final score, PV text,
//! and the irreversible validation timestamp.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::evaluation::validate_score;
use crate::types::Timestamp;

/// The result record attached to one candidature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub audition_score: Option<f64>,
    pub final_score: Option<f64>,
    pub pv_text: Option<String>,
    pub validated_at: Option<Timestamp>,
}

impl EvaluationResult {
    /// Once validated, the record is immutable.
    pub fn is_validated(&self) -> bool {
        self.validated_at.is_some()
    }

    /// Guard used by every write path: `Locked` once `validated_at` is set.
    pub fn ensure_mutable(&self) -> Result<(), CoreError> {
        if self.is_validated() {
            Err(CoreError::Locked(
                "Le résultat est validé et ne peut plus être modifié".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// PV length for the live character count.
    pub fn pv_char_count(&self) -> usize {
        self.pv_text.as_deref().map_or(0, |t| t.chars().count())
    }
}

/// The three editable fields, saved as a full replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDraft {
    pub audition_score: Option<f64>,
    pub final_score: Option<f64>,
    pub pv_text: Option<String>,
}

impl ResultDraft {
    /// Each score is optional; when present it must lie in `[0, 100]`.
    /// The PV has no client-side length constraint.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(score) = self.audition_score {
            validate_score(score)
                .map_err(|_| CoreError::Validation("Note audition: 0-100".to_string()))?;
        }
        if let Some(score) = self.final_score {
            validate_score(score)
                .map_err(|_| CoreError::Validation("Note finale: 0-100".to_string()))?;
        }
        Ok(())
    }
}
