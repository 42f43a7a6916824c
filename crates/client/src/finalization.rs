//! Président result finalization.
//!
//! Saving is freely repeatable while `validated_at` is null; validation is a
//! separate one-way operation. Once the record is validated every write path
//! is refused locally before it can reach the network, and the result is
//! re-fetched after validation so the authoritative timestamp is displayed,
//! never an assumed one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use avancement_core::result::{EvaluationResult, ResultDraft};
use avancement_core::types::DbId;

use crate::api::PresidentApi;
use crate::error::{ApiError, ApiResult};

pub struct ResultEditor {
    api: Arc<dyn PresidentApi>,
    candidature_id: DbId,
    result: Mutex<EvaluationResult>,
    busy: AtomicBool,
}

impl ResultEditor {
    pub fn new(api: Arc<dyn PresidentApi>, candidature_id: DbId) -> Self {
        Self {
            api,
            candidature_id,
            result: Mutex::new(EvaluationResult::default()),
            busy: AtomicBool::new(false),
        }
    }

    /// Fetch the authoritative result record.
    pub async fn load(&self) -> ApiResult<EvaluationResult> {
        let result = self.api.get_result(self.candidature_id).await?;
        *self.result.lock().unwrap_or_else(|e| e.into_inner()) = result.clone();
        Ok(result)
    }

    pub fn result(&self) -> EvaluationResult {
        self.result.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_validated(&self) -> bool {
        self.result().is_validated()
    }

    /// Save the three editable fields, replacing them wholesale.
    ///
    /// Refused locally once the record is validated; nothing reaches the
    /// network in that case.
    pub async fn save(&self, draft: &ResultDraft) -> ApiResult<()> {
        self.result().ensure_mutable()?;
        draft.validate()?;

        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ApiError::Cancelled);
        }
        let outcome = self.save_inner(draft).await;
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    async fn save_inner(&self, draft: &ResultDraft) -> ApiResult<()> {
        self.api.save_result(self.candidature_id, draft).await?;
        // Reconcile the optimistic copy against the server.
        self.load().await?;
        tracing::info!(candidature_id = self.candidature_id, "Result saved");
        Ok(())
    }

    /// Irreversibly validate the result.
    ///
    /// Never retried automatically: a success re-fetches the record (the
    /// server is the clock authority for `validated_at`), and an ambiguous
    /// failure re-fetches instead of assuming either outcome.
    pub async fn validate_final(&self) -> ApiResult<EvaluationResult> {
        self.result().ensure_mutable()?;

        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ApiError::Cancelled);
        }
        let outcome = self.validate_inner().await;
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    async fn validate_inner(&self) -> ApiResult<EvaluationResult> {
        match self.api.validate_final(self.candidature_id).await {
            Ok(_) => {
                tracing::info!(
                    candidature_id = self.candidature_id,
                    "Result validated; record is now immutable"
                );
                self.load().await
            }
            Err(e) => {
                if e.is_ambiguous() {
                    if let Err(refresh_err) = self.load().await {
                        tracing::warn!(
                            candidature_id = self.candidature_id,
                            error = %refresh_err,
                            "Result refresh failed after ambiguous validation"
                        );
                    }
                }
                Err(e)
            }
        }
    }
}
