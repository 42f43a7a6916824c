//! Commission notes editor.
//!
//! Rows are edited freely and persisted as one full-replace request.
//! Validation runs before dispatch and blocks the request entirely on the
//! first violation. Aggregate statistics are derived from the currently
//! loaded rows only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use avancement_core::evaluation::{
    add_template, aggregate, normalize_rows, EvaluationStats, NoteRow, TemplateOutcome,
};
use avancement_core::types::DbId;

use crate::api::ReviewApi;
use crate::error::{ApiError, ApiResult};

pub struct NotesEditor {
    api: Arc<dyn ReviewApi>,
    candidature_id: DbId,
    rows: Mutex<Vec<NoteRow>>,
    saving: AtomicBool,
}

impl NotesEditor {
    pub fn new(api: Arc<dyn ReviewApi>, candidature_id: DbId) -> Self {
        Self {
            api,
            candidature_id,
            rows: Mutex::new(vec![NoteRow::default()]),
            saving: AtomicBool::new(false),
        }
    }

    /// Load the persisted notes; an empty set becomes a single blank row so
    /// the editor always has something to type into.
    pub async fn load(&self) -> ApiResult<()> {
        let notes = self.api.get_notes(self.candidature_id).await?;
        let rows: Vec<NoteRow> = if notes.is_empty() {
            vec![NoteRow::default()]
        } else {
            notes.iter().map(NoteRow::from).collect()
        };
        *self.rows.lock().unwrap_or_else(|e| e.into_inner()) = rows;
        Ok(())
    }

    pub fn rows(&self) -> Vec<NoteRow> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_row(&self, index: usize, row: NoteRow) {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = rows.get_mut(index) {
            *slot = row;
        }
    }

    pub fn push_row(&self) {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NoteRow::default());
    }

    /// Remove a row; the editor always keeps at least one.
    pub fn remove_row(&self, index: usize) {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        if rows.len() > 1 && index < rows.len() {
            rows.remove(index);
        }
    }

    /// Add a template criterion. A duplicate (case-insensitive) is reported
    /// as an informational outcome, not an error.
    pub fn add_template(&self, criterion: &str) -> TemplateOutcome {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        add_template(&mut rows, criterion)
    }

    /// Statistics over the rows as currently loaded.
    pub fn stats(&self) -> EvaluationStats {
        aggregate(&self.rows.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Validate and persist the full note set.
    ///
    /// The first violation aborts before any network call. A trigger while a
    /// save is in flight is dropped.
    pub async fn save(&self) -> ApiResult<()> {
        let notes = normalize_rows(&self.rows())?;

        if self.saving.swap(true, Ordering::SeqCst) {
            return Err(ApiError::Cancelled);
        }
        let outcome = self.api.save_notes(self.candidature_id, &notes).await;
        self.saving.store(false, Ordering::SeqCst);

        if outcome.is_ok() {
            tracing::info!(
                candidature_id = self.candidature_id,
                notes = notes.len(),
                "Evaluation notes saved"
            );
        }
        outcome
    }
}
