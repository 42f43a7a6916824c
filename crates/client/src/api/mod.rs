//! The backend's logical interface, one trait per actor surface.
//!
//! Transport, JSON bodies, and cookie-based session auth live in the
//! [`http`] implementation; controllers and tests depend only on the traits.
//! Role-scoped listing endpoints return only the dossiers visible to the
//! caller; that filtering is trusted completely and never re-applied here.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use avancement_core::activites::{Activite, ActiviteInput, ActiviteType};
use avancement_core::deadline::Deadline;
use avancement_core::document::{Document, DocumentKind};
use avancement_core::enseignement::{Enseignement, EnseignementInput};
use avancement_core::evaluation::EvaluationNote;
use avancement_core::pfe::{Pfe, PfeInput};
use avancement_core::profile::{Profile, ProfileForm, ProfilePatch};
use avancement_core::result::{EvaluationResult, ResultDraft};
use avancement_core::status::{CandidatureHeader, CandidatureStatus};
use avancement_core::steps::Progress;
use avancement_core::types::{DbId, Timestamp};

use crate::error::ApiResult;
use crate::session::AuthUser;

/// Advisory upload progress callback (percent, 0–100). UI feedback only;
/// correctness never depends on it.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Payload of the candidature status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub exists: bool,
    pub step: u8,
    pub status: CandidatureStatus,
    pub progress: Option<Progress>,
    pub is_locked: bool,
    pub submitted_at: Option<Timestamp>,
}

/// Payload of a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub candidature: CandidatureHeader,
}

/// Full candidature fetch: header, progress, and the lock context the
/// wizard shell renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatureResponse {
    pub candidature: CandidatureHeader,
    pub progress: Progress,
    pub deadline: Option<Deadline>,
    pub is_locked: bool,
    pub can_edit: bool,
}

/// Profile fetch: the saved profile (if any) plus account pre-fill data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Option<Profile>,
    pub user: AccountSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub name: String,
    pub email: String,
}

/// A file staged for upload.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One dossier row in a role-scoped listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DossierSummary {
    pub id: DbId,
    pub status: CandidatureStatus,
    pub current_step: u8,
    pub submitted_at: Option<Timestamp>,
    pub locked_at: Option<Timestamp>,
    pub candidate: CandidateSummary,
    pub profile: Option<DossierProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: Option<DbId>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Nullable nested profile fields, with empty-string defaulting left to the
/// presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DossierProfile {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub specialite: Option<String>,
    pub etablissement: Option<String>,
}

/// A document row in a reviewer's dossier view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DossierDocument {
    pub id: DbId,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub original_name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub is_verified: bool,
}

/// Paginated listing envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

/// Payload of the irreversible validation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateFinalResponse {
    pub message: String,
    pub validated_at: Option<Timestamp>,
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthUser>;
    async fn logout(&self) -> ApiResult<()>;
    async fn me(&self) -> ApiResult<AuthUser>;
}

/// Public deadline listing.
#[async_trait]
pub trait DeadlinesApi: Send + Sync {
    async fn active(&self) -> ApiResult<Vec<Deadline>>;
}

/// Candidate-facing wizard endpoints.
#[async_trait]
pub trait CandidatApi: Send + Sync {
    async fn get_status(&self) -> ApiResult<StatusResponse>;

    /// Get (or implicitly create) the candidature with its full context.
    async fn get_candidature(&self) -> ApiResult<CandidatureResponse>;

    /// Triggers the draft → submitted transition. On success the caller
    /// clears all local drafts.
    async fn submit(&self) -> ApiResult<SubmitResponse>;

    async fn get_profile(&self) -> ApiResult<ProfileResponse>;

    /// Full save; enforces completeness server-side.
    async fn save_profile(&self, form: &ProfileForm) -> ApiResult<Profile>;

    /// Partial save; tolerates any subset of fields.
    async fn autosave_profile(&self, patch: &ProfilePatch) -> ApiResult<Profile>;

    /// Full-replace semantics: the echoed records carry server-assigned ids.
    async fn bulk_save_enseignements(
        &self,
        items: &[EnseignementInput],
    ) -> ApiResult<Vec<Enseignement>>;

    async fn bulk_save_pfes(&self, items: &[PfeInput]) -> ApiResult<Vec<Pfe>>;

    async fn bulk_save_activites(
        &self,
        kind: ActiviteType,
        items: &[ActiviteInput],
    ) -> ApiResult<Vec<Activite>>;

    async fn list_documents(&self, kind: Option<DocumentKind>) -> ApiResult<Vec<Document>>;

    async fn upload_document(
        &self,
        kind: DocumentKind,
        upload: DocumentUpload,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Document>;

    /// Upload the justification for one activity entry.
    async fn upload_for_activite(
        &self,
        activite_id: DbId,
        upload: DocumentUpload,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Document>;

    async fn delete_document(&self, id: DbId) -> ApiResult<()>;
}

/// Dossier review endpoints shared by the commission and président consoles.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn list_dossiers(&self, page: u32, per_page: u32) -> ApiResult<Page<DossierSummary>>;

    async fn get_dossier(&self, candidature_id: DbId) -> ApiResult<DossierSummary>;

    async fn list_dossier_documents(
        &self,
        candidature_id: DbId,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<DossierDocument>>;

    /// Fetch document bytes for preview. Cancelling the token aborts the
    /// request rather than merely ignoring its result.
    async fn download_document_bytes(
        &self,
        document_id: DbId,
        cancel: CancellationToken,
    ) -> ApiResult<Vec<u8>>;

    async fn get_notes(&self, candidature_id: DbId) -> ApiResult<Vec<EvaluationNote>>;

    /// Full-replace: the submitted set becomes the dossier's note set.
    async fn save_notes(&self, candidature_id: DbId, items: &[EvaluationNote]) -> ApiResult<()>;
}

/// Président-only finalization endpoints, on top of dossier review.
#[async_trait]
pub trait PresidentApi: ReviewApi {
    async fn get_result(&self, candidature_id: DbId) -> ApiResult<EvaluationResult>;

    /// Freely repeatable before validation; replaces all three fields.
    async fn save_result(&self, candidature_id: DbId, draft: &ResultDraft) -> ApiResult<()>;

    /// One-way. The server is the clock authority for `validated_at`.
    async fn validate_final(&self, candidature_id: DbId) -> ApiResult<ValidateFinalResponse>;
}
