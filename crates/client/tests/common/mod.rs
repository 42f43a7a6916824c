//! Shared test fixtures: an in-memory backend implementing the API traits,
//! with request counters so tests can assert what was (and was not)
//! dispatched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use avancement_client::api::{
    AccountSummary, CandidatApi, CandidatureResponse, DossierDocument, DossierSummary,
    DocumentUpload, Page, PageMeta, PresidentApi, ProfileResponse, ProgressFn, ReviewApi,
    StatusResponse, SubmitResponse,
};
use avancement_client::error::{ApiError, ApiResult};
use avancement_core::activites::{Activite, ActiviteInput, ActiviteType};
use avancement_core::document::{Document, DocumentKind};
use avancement_core::enseignement::{equivalent_tp, Enseignement, EnseignementInput};
use avancement_core::evaluation::EvaluationNote;
use avancement_core::pfe::{Pfe, PfeInput};
use avancement_core::profile::{Profile, ProfileForm, ProfilePatch};
use avancement_core::result::{EvaluationResult, ResultDraft};
use avancement_core::status::{CandidatureHeader, CandidatureStatus};
use avancement_core::steps::{Progress, WizardStep, REQUIRED_STEPS};
use avancement_core::types::{DbId, Timestamp};

pub const CANDIDATURE_ID: DbId = 42;

/// Install the test tracing subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The timestamp the fake backend stamps on validation: tests assert the
/// client displays this value, not a locally assumed one.
pub fn server_validation_instant() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap()
}

/// In-memory backend shared by the candidate, commission, and président
/// surfaces.
#[derive(Default)]
pub struct FakeBackend {
    pub status: Mutex<Option<StatusResponse>>,
    pub notes: Mutex<Vec<EvaluationNote>>,
    pub result: Mutex<EvaluationResult>,
    pub documents: Mutex<HashMap<DbId, Vec<u8>>>,
    /// Per-document artificial latency for preview fetches.
    pub download_delay: Mutex<HashMap<DbId, Duration>>,

    pub status_requests: AtomicUsize,
    pub submit_requests: AtomicUsize,
    pub autosave_requests: AtomicUsize,
    pub profile_saves: AtomicUsize,
    pub notes_saves: AtomicUsize,
    pub result_saves: AtomicUsize,
    pub validations: AtomicUsize,

    pub fail_submit: AtomicBool,
    pub fail_autosave: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.set_progress(&[]);
        backend
    }

    /// Reset the candidature to a draft with the given steps complete.
    pub fn set_progress(&self, complete: &[WizardStep]) {
        let progress =
            Progress::from_completed(REQUIRED_STEPS.iter().map(|s| (*s, complete.contains(s))));
        let mut status = self.status.lock().unwrap();
        let current = status.take();
        *status = Some(StatusResponse {
            exists: true,
            step: 1,
            status: current
                .as_ref()
                .map(|s| s.status)
                .unwrap_or(CandidatureStatus::Draft),
            progress: Some(progress),
            is_locked: current.as_ref().is_some_and(|s| s.is_locked),
            submitted_at: current.and_then(|s| s.submitted_at),
        });
    }

    pub fn complete_all_steps(&self) {
        self.set_progress(&REQUIRED_STEPS);
    }

    pub fn store_document(&self, id: DbId, bytes: Vec<u8>, delay: Duration) {
        self.documents.lock().unwrap().insert(id, bytes);
        self.download_delay.lock().unwrap().insert(id, delay);
    }

    fn current_status(&self) -> StatusResponse {
        self.status
            .lock()
            .unwrap()
            .clone()
            .expect("fake backend status initialized")
    }

    fn fake_profile(&self) -> Profile {
        Profile {
            id: 1,
            candidature_id: CANDIDATURE_ID,
            nom: "Alaoui".to_string(),
            prenom: "Samira".to_string(),
            date_naissance: "1983-04-12".to_string(),
            etablissement: "ENSAM Casablanca".to_string(),
            ville: "Casablanca".to_string(),
            departement: "Génie Mécanique".to_string(),
            grade_actuel: "Maître de Conférences".to_string(),
            date_recrutement_es: "2014-09-01".to_string(),
            date_recrutement_fp: None,
            numero_som: Some("SOM-4521".to_string()),
            telephone: "+212600000000".to_string(),
            specialite: "Mécanique des fluides".to_string(),
            is_complete: true,
        }
    }
}

#[async_trait]
impl CandidatApi for FakeBackend {
    async fn get_status(&self) -> ApiResult<StatusResponse> {
        self.status_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.current_status())
    }

    async fn get_candidature(&self) -> ApiResult<CandidatureResponse> {
        let status = self.current_status();
        Ok(CandidatureResponse {
            candidature: CandidatureHeader {
                id: CANDIDATURE_ID,
                user_id: 7,
                current_step: status.step,
                status: status.status,
                submitted_at: status.submitted_at,
                locked_at: status.submitted_at,
            },
            progress: status.progress.clone().unwrap_or_default(),
            deadline: None,
            is_locked: status.is_locked,
            can_edit: status.status == CandidatureStatus::Draft && !status.is_locked,
        })
    }

    async fn submit(&self) -> ApiResult<SubmitResponse> {
        self.submit_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection reset".to_string()));
        }

        let submitted_at = Utc::now();
        let mut status = self.status.lock().unwrap();
        let previous = status.clone().expect("fake backend status initialized");
        *status = Some(StatusResponse {
            status: CandidatureStatus::Submitted,
            is_locked: true,
            submitted_at: Some(submitted_at),
            ..previous
        });

        Ok(SubmitResponse {
            message: "Dossier soumis avec succès".to_string(),
            candidature: CandidatureHeader {
                id: CANDIDATURE_ID,
                user_id: 7,
                current_step: 6,
                status: CandidatureStatus::Submitted,
                submitted_at: Some(submitted_at),
                locked_at: Some(submitted_at),
            },
        })
    }

    async fn get_profile(&self) -> ApiResult<ProfileResponse> {
        Ok(ProfileResponse {
            profile: Some(self.fake_profile()),
            user: AccountSummary {
                name: "Samira Alaoui".to_string(),
                email: "s.alaoui@example.ma".to_string(),
            },
        })
    }

    async fn save_profile(&self, _form: &ProfileForm) -> ApiResult<Profile> {
        self.profile_saves.fetch_add(1, Ordering::SeqCst);
        Ok(self.fake_profile())
    }

    async fn autosave_profile(&self, _patch: &ProfilePatch) -> ApiResult<Profile> {
        self.autosave_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_autosave.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(self.fake_profile())
    }

    async fn bulk_save_enseignements(
        &self,
        items: &[EnseignementInput],
    ) -> ApiResult<Vec<Enseignement>> {
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| Enseignement {
                id: i as DbId + 1,
                candidature_id: CANDIDATURE_ID,
                annee_universitaire: item.annee_universitaire.clone(),
                intitule: item.intitule.clone(),
                type_enseignement: item.type_enseignement,
                type_module: item.type_module,
                niveau: item.niveau.clone(),
                volume_horaire: item.volume_horaire,
                equivalent_tp: equivalent_tp(item.volume_horaire, item.type_enseignement),
            })
            .collect())
    }

    async fn bulk_save_pfes(&self, items: &[PfeInput]) -> ApiResult<Vec<Pfe>> {
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| Pfe {
                id: i as DbId + 1,
                candidature_id: CANDIDATURE_ID,
                annee_universitaire: item.annee_universitaire.clone(),
                intitule: item.intitule.clone(),
                niveau: item.niveau,
                volume_horaire: item.volume_horaire,
            })
            .collect())
    }

    async fn bulk_save_activites(
        &self,
        kind: ActiviteType,
        items: &[ActiviteInput],
    ) -> ApiResult<Vec<Activite>> {
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| Activite {
                id: i as DbId + 1,
                candidature_id: CANDIDATURE_ID,
                kind,
                category: item.category.clone(),
                subcategory: item.subcategory.clone(),
                count: item.count,
                document: None,
            })
            .collect())
    }

    async fn list_documents(&self, _kind: Option<DocumentKind>) -> ApiResult<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn upload_document(
        &self,
        kind: DocumentKind,
        upload: DocumentUpload,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Document> {
        if let Some(on_progress) = on_progress {
            on_progress(100);
        }
        Ok(Document {
            id: 1,
            candidature_id: CANDIDATURE_ID,
            activite_id: None,
            kind,
            original_name: upload.original_name,
            mime_type: upload.mime_type,
            size: upload.bytes.len() as u64,
            is_verified: false,
            created_at: Utc::now(),
        })
    }

    async fn upload_for_activite(
        &self,
        activite_id: DbId,
        upload: DocumentUpload,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Document> {
        if let Some(on_progress) = on_progress {
            on_progress(100);
        }
        Ok(Document {
            id: 1,
            candidature_id: CANDIDATURE_ID,
            activite_id: Some(activite_id),
            kind: DocumentKind::ActiviteJustification,
            original_name: upload.original_name,
            mime_type: upload.mime_type,
            size: upload.bytes.len() as u64,
            is_verified: false,
            created_at: Utc::now(),
        })
    }

    async fn delete_document(&self, _id: DbId) -> ApiResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ReviewApi for FakeBackend {
    async fn list_dossiers(&self, page: u32, per_page: u32) -> ApiResult<Page<DossierSummary>> {
        Ok(Page {
            data: Vec::new(),
            meta: PageMeta {
                page,
                per_page,
                total: 0,
                last_page: 1,
            },
        })
    }

    async fn get_dossier(&self, candidature_id: DbId) -> ApiResult<DossierSummary> {
        Ok(DossierSummary {
            id: candidature_id,
            status: self.current_status().status,
            current_step: 6,
            submitted_at: self.current_status().submitted_at,
            locked_at: None,
            candidate: avancement_client::api::CandidateSummary {
                id: Some(7),
                name: Some("Samira Alaoui".to_string()),
                email: Some("s.alaoui@example.ma".to_string()),
            },
            profile: None,
        })
    }

    async fn list_dossier_documents(
        &self,
        _candidature_id: DbId,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<DossierDocument>> {
        Ok(Page {
            data: Vec::new(),
            meta: PageMeta {
                page,
                per_page,
                total: 0,
                last_page: 1,
            },
        })
    }

    async fn download_document_bytes(
        &self,
        document_id: DbId,
        cancel: CancellationToken,
    ) -> ApiResult<Vec<u8>> {
        let delay = self
            .download_delay
            .lock()
            .unwrap()
            .get(&document_id)
            .copied()
            .unwrap_or_default();
        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            _ = tokio::time::sleep(delay) => {
                self.documents
                    .lock()
                    .unwrap()
                    .get(&document_id)
                    .cloned()
                    .ok_or(ApiError::Request {
                        status: 404,
                        message: "Document introuvable".to_string(),
                        fields: None,
                    })
            }
        }
    }

    async fn get_notes(&self, _candidature_id: DbId) -> ApiResult<Vec<EvaluationNote>> {
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn save_notes(&self, _candidature_id: DbId, items: &[EvaluationNote]) -> ApiResult<()> {
        self.notes_saves.fetch_add(1, Ordering::SeqCst);
        *self.notes.lock().unwrap() = items.to_vec();
        Ok(())
    }
}

#[async_trait]
impl PresidentApi for FakeBackend {
    async fn get_result(&self, _candidature_id: DbId) -> ApiResult<EvaluationResult> {
        Ok(self.result.lock().unwrap().clone())
    }

    async fn save_result(&self, _candidature_id: DbId, draft: &ResultDraft) -> ApiResult<()> {
        self.result_saves.fetch_add(1, Ordering::SeqCst);
        let mut result = self.result.lock().unwrap();
        result.audition_score = draft.audition_score;
        result.final_score = draft.final_score;
        result.pv_text = draft.pv_text.clone();
        Ok(())
    }

    async fn validate_final(
        &self,
        _candidature_id: DbId,
    ) -> ApiResult<avancement_client::api::ValidateFinalResponse> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        let mut result = self.result.lock().unwrap();
        if result.validated_at.is_some() {
            return Err(ApiError::Request {
                status: 409,
                message: "Résultat déjà validé".to_string(),
                fields: None,
            });
        }
        result.validated_at = Some(server_validation_instant());
        Ok(avancement_client::api::ValidateFinalResponse {
            message: "Résultat validé".to_string(),
            validated_at: result.validated_at,
        })
    }
}
