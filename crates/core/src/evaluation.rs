//! Per-criterion evaluation notes and their aggregation.
//!
//! Notes are edited as free rows and persisted as a full replacement set.
//! Validation runs before any dispatch: a persisted row must carry a
//! criterion, and a score, when present, must lie in `[0, 100]`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum accepted score.
pub const SCORE_MIN: f64 = 0.0;

/// Maximum accepted score.
pub const SCORE_MAX: f64 = 100.0;

/// One persisted evaluation note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationNote {
    pub criterion: String,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

/// One editable row as held by the UI: score still textual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteRow {
    pub criterion: String,
    pub score: String,
    pub comment: String,
}

impl NoteRow {
    pub fn is_blank(&self) -> bool {
        self.criterion.trim().is_empty()
            && self.score.trim().is_empty()
            && self.comment.trim().is_empty()
    }
}

impl From<&EvaluationNote> for NoteRow {
    fn from(note: &EvaluationNote) -> Self {
        Self {
            criterion: note.criterion.clone(),
            score: note.score.map(|s| s.to_string()).unwrap_or_default(),
            comment: note.comment.clone().unwrap_or_default(),
        }
    }
}

/// Validate that a score lies within the accepted range.
pub fn validate_score(score: f64) -> Result<(), CoreError> {
    if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(CoreError::Validation(
            "Score doit être entre 0 et 100".to_string(),
        ));
    }
    Ok(())
}

/// Normalize editable rows into the set of notes to persist.
///
/// Blank rows are dropped (never persisted). Any remaining row must have a
/// criterion, and a parseable in-range score when one is typed. The first
/// violation aborts the whole set; nothing reaches the network.
pub fn normalize_rows(rows: &[NoteRow]) -> Result<Vec<EvaluationNote>, CoreError> {
    let mut notes = Vec::new();
    for row in rows {
        if row.is_blank() {
            continue;
        }

        let criterion = row.criterion.trim();
        if criterion.is_empty() {
            return Err(CoreError::Validation(
                "Le critère est obligatoire".to_string(),
            ));
        }

        let score_text = row.score.trim();
        let score = if score_text.is_empty() {
            None
        } else {
            let parsed: f64 = score_text
                .parse()
                .map_err(|_| CoreError::Validation("Score invalide".to_string()))?;
            validate_score(parsed)?;
            Some(parsed)
        };

        let comment = row.comment.trim();
        notes.push(EvaluationNote {
            criterion: criterion.to_string(),
            score,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        });
    }
    Ok(notes)
}

/// Aggregate statistics over the loaded rows, shared by the commission and
/// président views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvaluationStats {
    pub total: f64,
    pub avg: f64,
    /// Rows with both a criterion and a parseable score.
    pub count: usize,
    /// Rows with a criterion but no score.
    pub unscored: usize,
}

/// Compute stats over editable rows. Rows without a criterion are ignored;
/// rows with a criterion but a blank or unparseable score are counted as
/// `unscored` and excluded from the average.
pub fn aggregate(rows: &[NoteRow]) -> EvaluationStats {
    let mut stats = EvaluationStats::default();
    for row in rows {
        if row.criterion.trim().is_empty() {
            continue;
        }
        match row.score.trim().parse::<f64>() {
            Ok(score) if score.is_finite() => {
                stats.total += score;
                stats.count += 1;
            }
            _ => stats.unscored += 1,
        }
    }
    if stats.count > 0 {
        stats.avg = stats.total / stats.count as f64;
    }
    stats
}

/// Outcome of adding a template criterion to the row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOutcome {
    Added,
    /// The criterion already exists (case-insensitive). Informational only;
    /// duplicates are a nuisance, not a data-integrity violation.
    Duplicate,
}

/// Add a template criterion unless it is already present.
///
/// A single all-blank row is replaced rather than appended to, so the first
/// template lands in the empty editor cleanly.
pub fn add_template(rows: &mut Vec<NoteRow>, criterion: &str) -> TemplateOutcome {
    let wanted = criterion.trim();
    if rows
        .iter()
        .any(|r| r.criterion.trim().eq_ignore_ascii_case(wanted))
    {
        return TemplateOutcome::Duplicate;
    }

    let row = NoteRow {
        criterion: wanted.to_string(),
        ..Default::default()
    };
    if rows.len() == 1 && rows[0].is_blank() {
        rows[0] = row;
    } else {
        rows.push(row);
    }
    TemplateOutcome::Added
}
