//! Candidate wizard orchestration.
//!
//! Holds the latest known candidature status, gates navigation and
//! submission, and keeps each step's form shadowed in the local draft cache
//! with debounced writes. Autosave is best-effort: failures are logged and
//! swallowed, never surfaced to the editing flow. The draft cache is cleared
//! exactly once, after a confirmed successful submission.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use avancement_core::activites::{Activite, ActiviteInput, ActiviteType};
use avancement_core::enseignement::{Enseignement, EnseignementInput};
use avancement_core::navigator::{check_navigation, NavigationDecision};
use avancement_core::pfe::{Pfe, PfeInput};
use avancement_core::profile::{Profile, ProfileForm, ProfilePatch};
use avancement_core::steps::{Progress, WizardStep};
use avancement_core::submission::{check_submission, Confirmations, SubmissionBlocker};
use avancement_core::types::Timestamp;
use avancement_store::{merge_remote_over_local, Debouncer, DraftStore};

use crate::api::{CandidatApi, StatusResponse, SubmitResponse};
use crate::error::{ApiError, ApiResult};

/// Draft key for the profile step.
pub const FORM_PROFILE: &str = "profile";
/// Draft key for the teaching records step.
pub const FORM_ENSEIGNEMENTS: &str = "enseignements";
/// Draft key for the supervised projects step.
pub const FORM_PFES: &str = "pfes";
/// Draft key for the teaching activities step.
pub const FORM_ACTIVITES_ENSEIGNEMENT: &str = "activites_enseignement";
/// Draft key for the research activities step.
pub const FORM_ACTIVITES_RECHERCHE: &str = "activites_recherche";

/// Quiet period before an edit is written to the local draft cache.
pub const LOCAL_DRAFT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Quiet period before an edit is autosaved to the server.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(3);

/// A step form reconciled against fresh server data.
#[derive(Debug, Clone)]
pub struct FormState {
    /// Server fields win on overlapping keys; the draft fills gaps.
    pub data: serde_json::Value,
    /// When the surviving local draft was last written, if one existed.
    pub draft_saved_at: Option<Timestamp>,
}

/// Outcome of a submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(SubmitResponse),
    /// Preconditions failed; nothing was dispatched.
    Blocked(Vec<SubmissionBlocker>),
    /// A submission is already in flight; this attempt was a no-op.
    InFlight,
}

pub struct WizardController {
    api: Arc<dyn CandidatApi>,
    drafts: Arc<dyn DraftStore>,
    draft_debouncers: Mutex<HashMap<&'static str, Arc<Debouncer>>>,
    autosave_debouncer: Debouncer,
    status: Mutex<Option<StatusResponse>>,
    submitting: AtomicBool,
    autosaving: Arc<AtomicBool>,
    saving: AtomicBool,
}

impl WizardController {
    pub fn new(api: Arc<dyn CandidatApi>, drafts: Arc<dyn DraftStore>) -> Self {
        Self {
            api,
            drafts,
            draft_debouncers: Mutex::new(HashMap::new()),
            autosave_debouncer: Debouncer::new(AUTOSAVE_DEBOUNCE),
            status: Mutex::new(None),
            submitting: AtomicBool::new(false),
            autosaving: Arc::new(AtomicBool::new(false)),
            saving: AtomicBool::new(false),
        }
    }

    /// Fetch and cache the authoritative candidature status.
    pub async fn refresh_status(&self) -> ApiResult<StatusResponse> {
        let status = self.api.get_status().await?;
        let mut cached = self.status.lock().unwrap_or_else(|e| e.into_inner());
        *cached = Some(status.clone());
        Ok(status)
    }

    /// The last fetched status, if any.
    pub fn cached_status(&self) -> Option<StatusResponse> {
        self.status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn cached_progress(&self) -> Progress {
        self.cached_status()
            .and_then(|s| s.progress)
            .unwrap_or_default()
    }

    fn current_step(&self) -> WizardStep {
        self.cached_status()
            .and_then(|s| WizardStep::from_number(s.step).ok())
            .unwrap_or(WizardStep::Profil)
    }

    /// Decide a navigation attempt.
    ///
    /// Backward movement is decided from the cached progress (it is always
    /// allowed regardless). A forward attempt first re-fetches the status so
    /// the guard never evaluates progress staled by an in-flight autosave.
    pub async fn navigate(&self, target: WizardStep) -> ApiResult<NavigationDecision> {
        let current = self.current_step();
        if target.to_number() > current.to_number() {
            self.refresh_status().await?;
        }
        Ok(check_navigation(target, current, &self.cached_progress()))
    }

    /// Merge a step's local draft under fresh server data.
    pub fn reconcile_form(&self, form: &str, server_value: &serde_json::Value) -> FormState {
        let draft = match self.drafts.load(form) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(form, error = %e, "Draft load failed; using server data only");
                None
            }
        };
        match draft {
            Some(entry) => FormState {
                data: merge_remote_over_local(&entry.data, server_value),
                draft_saved_at: Some(entry.saved_at),
            },
            None => FormState {
                data: server_value.clone(),
                draft_saved_at: None,
            },
        }
    }

    fn draft_debouncer(&self, form: &'static str) -> Arc<Debouncer> {
        let mut debouncers = self
            .draft_debouncers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            debouncers
                .entry(form)
                .or_insert_with(|| Arc::new(Debouncer::new(LOCAL_DRAFT_DEBOUNCE))),
        )
    }

    /// Record an edit: the in-memory state is already current, the draft
    /// cache catches up after the quiet period. Storage failures stay
    /// invisible to the user.
    pub fn stage_edit(&self, form: &'static str, value: serde_json::Value) {
        let drafts = Arc::clone(&self.drafts);
        self.draft_debouncer(form).call(async move {
            if let Err(e) = drafts.save(form, &value) {
                tracing::warn!(form, error = %e, "Draft save failed; in-memory state unaffected");
            }
        });
    }

    /// Queue a debounced partial autosave of the profile form.
    ///
    /// Explicitly best-effort: failures are logged and swallowed, and a
    /// trigger while a previous autosave is still in flight is dropped.
    pub fn queue_profile_autosave(&self, form: &ProfileForm) {
        let patch = ProfilePatch::from(form);
        if patch.is_empty() {
            return;
        }
        let api = Arc::clone(&self.api);
        let in_flight = Arc::clone(&self.autosaving);
        self.autosave_debouncer.call(async move {
            if in_flight.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Err(e) = api.autosave_profile(&patch).await {
                tracing::warn!(error = %e, "Profile autosave failed; local draft remains the safety net");
            }
            in_flight.store(false, Ordering::SeqCst);
        });
    }

    /// Explicit full profile save. Validates completeness before dispatch;
    /// on success the step's draft is superseded and cleared.
    pub async fn save_profile(&self, form: &ProfileForm) -> ApiResult<Profile> {
        form.validate_complete()?;
        self.explicit_save(FORM_PROFILE, self.api.save_profile(form))
            .await
    }

    /// Full-replace save of the teaching records step.
    pub async fn save_enseignements(
        &self,
        items: &[EnseignementInput],
    ) -> ApiResult<Vec<Enseignement>> {
        for item in items {
            item.validate()?;
        }
        self.explicit_save(
            FORM_ENSEIGNEMENTS,
            self.api.bulk_save_enseignements(items),
        )
        .await
    }

    /// Full-replace save of the supervised projects step.
    pub async fn save_pfes(&self, items: &[PfeInput]) -> ApiResult<Vec<Pfe>> {
        for item in items {
            item.validate()?;
        }
        self.explicit_save(FORM_PFES, self.api.bulk_save_pfes(items))
            .await
    }

    /// Full-replace save of one activity step.
    pub async fn save_activites(
        &self,
        kind: ActiviteType,
        items: &[ActiviteInput],
    ) -> ApiResult<Vec<Activite>> {
        for item in items {
            item.validate(kind)?;
        }
        let form = match kind {
            ActiviteType::Enseignement => FORM_ACTIVITES_ENSEIGNEMENT,
            ActiviteType::Recherche => FORM_ACTIVITES_RECHERCHE,
        };
        self.explicit_save(form, self.api.bulk_save_activites(kind, items))
            .await
    }

    /// Shared plumbing for user-triggered saves: one in flight at a time,
    /// draft cleared and status refreshed after a confirmed write.
    async fn explicit_save<T>(
        &self,
        form: &'static str,
        request: impl std::future::Future<Output = ApiResult<T>>,
    ) -> ApiResult<T> {
        if self.saving.swap(true, Ordering::SeqCst) {
            return Err(ApiError::Cancelled);
        }
        let outcome = request.await;
        if outcome.is_ok() {
            self.draft_debouncer(form).cancel();
            if let Err(e) = self.drafts.clear(form) {
                tracing::warn!(form, error = %e, "Draft clear failed after save");
            }
            if let Err(e) = self.refresh_status().await {
                tracing::warn!(error = %e, "Status refresh failed after save");
            }
        }
        self.saving.store(false, Ordering::SeqCst);
        outcome
    }

    /// Attempt the final submission.
    ///
    /// Preconditions are checked against local state first, so a blocked
    /// attempt dispatches nothing at all; when they hold, the status is
    /// re-fetched and re-checked immediately before the one dispatch. On
    /// success every local draft is cleared. A failure leaves state
    /// unchanged and the caller simply retries; an ambiguous failure
    /// re-fetches the authoritative status rather than assuming an outcome.
    pub async fn submit(&self, confirmations: &Confirmations) -> ApiResult<SubmitOutcome> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Ok(SubmitOutcome::InFlight);
        }
        let outcome = self.submit_inner(confirmations).await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn submit_inner(&self, confirmations: &Confirmations) -> ApiResult<SubmitOutcome> {
        if let Some(cached) = self.cached_status() {
            let progress = cached.progress.unwrap_or_default();
            let blockers = check_submission(&progress, confirmations, cached.status);
            if !blockers.is_empty() {
                return Ok(SubmitOutcome::Blocked(blockers));
            }
        } else if !confirmations.all_checked() {
            return Ok(SubmitOutcome::Blocked(vec![
                SubmissionBlocker::MissingConfirmations,
            ]));
        }

        // Fresh read before the irreversible dispatch.
        let status = self.refresh_status().await?;
        let progress = status.progress.unwrap_or_default();
        let blockers = check_submission(&progress, confirmations, status.status);
        if !blockers.is_empty() {
            return Ok(SubmitOutcome::Blocked(blockers));
        }

        match self.api.submit().await {
            Ok(response) => {
                // The server record is now the sole source of truth.
                if let Err(e) = self.drafts.clear_all() {
                    tracing::warn!(error = %e, "Draft cleanup failed after submission");
                }
                tracing::info!(
                    candidature_id = response.candidature.id,
                    "Candidature submitted"
                );
                if let Err(e) = self.refresh_status().await {
                    tracing::warn!(error = %e, "Status refresh failed after submission");
                }
                Ok(SubmitOutcome::Submitted(response))
            }
            Err(e) => {
                if e.is_ambiguous() {
                    if let Err(refresh_err) = self.refresh_status().await {
                        tracing::warn!(error = %refresh_err, "Status refresh failed after ambiguous submit");
                    }
                }
                Err(e)
            }
        }
    }
}
