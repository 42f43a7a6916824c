//! reqwest-backed implementation of the API traits.
//!
//! JSON bodies, cookie-based session auth, and a per-request `x-request-id`
//! header. Responses are normalized into [`ApiError`]: 401 becomes
//! `Unauthenticated`, other rejections carry the server's message and its
//! optional field-keyed error map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use avancement_core::activites::{Activite, ActiviteInput, ActiviteType};
use avancement_core::deadline::Deadline;
use avancement_core::document::{validate_upload, Document, DocumentKind};
use avancement_core::enseignement::{Enseignement, EnseignementInput};
use avancement_core::evaluation::EvaluationNote;
use avancement_core::pfe::{Pfe, PfeInput};
use avancement_core::profile::{Profile, ProfileForm, ProfilePatch};
use avancement_core::result::{EvaluationResult, ResultDraft};
use avancement_core::types::DbId;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::AuthUser;

use super::{
    AuthApi, CandidatApi, CandidatureResponse, DeadlinesApi, DocumentUpload, DossierDocument,
    DossierSummary, Page, PresidentApi, ProfileResponse, ProgressFn, ReviewApi, StatusResponse,
    SubmitResponse, ValidateFinalResponse,
};

/// Upload chunk size for progress reporting.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Error body shape shared by all backend endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    profile: Profile,
}

#[derive(Debug, Deserialize)]
struct EnseignementsEnvelope {
    enseignements: Vec<Enseignement>,
}

#[derive(Debug, Deserialize)]
struct PfesEnvelope {
    pfes: Vec<Pfe>,
}

#[derive(Debug, Deserialize)]
struct ActivitesEnvelope {
    activites: Vec<Activite>,
}

#[derive(Debug, Deserialize)]
struct DocumentsEnvelope {
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct DocumentEnvelope {
    document: Document,
}

/// Shared request plumbing: client, base URL, response normalization.
#[derive(Debug)]
struct Transport {
    http: reqwest::Client,
    base_url: String,
}

impl Transport {
    fn new(config: &ClientConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .header("x-request-id", uuid::Uuid::new_v4().to_string())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and normalize the outcome, returning the raw response
    /// for the caller to consume.
    async fn send(&self, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthenticated);
        }

        let body: Option<ErrorBody> = response.json().await.ok();
        let (message, fields) = match body {
            Some(body) => (
                body.message
                    .or(body.error)
                    .unwrap_or_else(|| "Request failed".to_string()),
                body.errors,
            ),
            None => ("Request failed".to_string(), None),
        };
        Err(ApiError::Request {
            status: status.as_u16(),
            message,
            fields,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Network(format!("Invalid response body: {e}")))
    }

    /// Execute and discard the response body.
    async fn execute_unit(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await.map(|_| ())
    }

    /// Execute a byte download that can be aborted by the token; an aborted
    /// fetch is dropped, not left racing.
    async fn execute_bytes(
        &self,
        builder: RequestBuilder,
        cancel: CancellationToken,
    ) -> ApiResult<Vec<u8>> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            response = self.send(builder) => {
                let response = response?;
                tokio::select! {
                    _ = cancel.cancelled() => Err(ApiError::Cancelled),
                    bytes = response.bytes() => Ok(bytes?.to_vec()),
                }
            }
        }
    }
}

/// Wrap upload bytes in a streamed multipart part that reports advisory
/// progress as chunks are consumed.
fn progress_part(upload: DocumentUpload, on_progress: Option<ProgressFn>) -> ApiResult<Part> {
    let total = upload.bytes.len();
    let mime_type = upload.mime_type.clone();
    let chunks: Vec<Vec<u8>> = upload
        .bytes
        .chunks(UPLOAD_CHUNK_SIZE)
        .map(<[u8]>::to_vec)
        .collect();

    let mut sent = 0usize;
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        if let Some(on_progress) = &on_progress {
            let percent = if total == 0 {
                100
            } else {
                (sent * 100 / total) as u8
            };
            on_progress(percent);
        }
        Ok::<_, std::convert::Infallible>(chunk)
    }));

    let body = reqwest::Body::wrap_stream(stream);
    Part::stream_with_length(body, total as u64)
        .file_name(upload.original_name)
        .mime_str(&mime_type)
        .map_err(|e| ApiError::Network(format!("Invalid upload part: {e}")))
}

/// Candidate, auth, and deadline endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    transport: Arc<Transport>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        Ok(Self {
            transport: Arc::new(Transport::new(config)?),
        })
    }

    /// Dossier review endpoints scoped to the commission console.
    pub fn commission(&self) -> HttpReviewApi {
        HttpReviewApi {
            transport: Arc::clone(&self.transport),
            prefix: "/commission",
        }
    }

    /// Dossier review plus finalization, scoped to the président console.
    pub fn president(&self) -> HttpPresidentApi {
        HttpPresidentApi {
            review: HttpReviewApi {
                transport: Arc::clone(&self.transport),
                prefix: "/president",
            },
        }
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthUser> {
        let body = serde_json::json!({ "email": email, "password": password });
        let envelope: UserEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::POST, "/auth/login")
                    .json(&body),
            )
            .await?;
        Ok(envelope.user)
    }

    async fn logout(&self) -> ApiResult<()> {
        self.transport
            .execute_unit(self.transport.request(Method::POST, "/auth/logout"))
            .await
    }

    async fn me(&self) -> ApiResult<AuthUser> {
        let envelope: UserEnvelope = self
            .transport
            .execute(self.transport.request(Method::GET, "/auth/me"))
            .await?;
        Ok(envelope.user)
    }
}

#[async_trait]
impl DeadlinesApi for HttpApi {
    async fn active(&self) -> ApiResult<Vec<Deadline>> {
        let envelope: DataEnvelope<Vec<Deadline>> = self
            .transport
            .execute(self.transport.request(Method::GET, "/deadlines/active"))
            .await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl CandidatApi for HttpApi {
    async fn get_status(&self) -> ApiResult<StatusResponse> {
        self.transport
            .execute(
                self.transport
                    .request(Method::GET, "/candidat/candidature/status"),
            )
            .await
    }

    async fn get_candidature(&self) -> ApiResult<CandidatureResponse> {
        self.transport
            .execute(self.transport.request(Method::GET, "/candidat/candidature"))
            .await
    }

    async fn submit(&self) -> ApiResult<SubmitResponse> {
        self.transport
            .execute(
                self.transport
                    .request(Method::POST, "/candidat/candidature/submit"),
            )
            .await
    }

    async fn get_profile(&self) -> ApiResult<ProfileResponse> {
        self.transport
            .execute(self.transport.request(Method::GET, "/candidat/profile"))
            .await
    }

    async fn save_profile(&self, form: &ProfileForm) -> ApiResult<Profile> {
        let envelope: ProfileEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::POST, "/candidat/profile")
                    .json(form),
            )
            .await?;
        Ok(envelope.profile)
    }

    async fn autosave_profile(&self, patch: &ProfilePatch) -> ApiResult<Profile> {
        let envelope: ProfileEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::PATCH, "/candidat/profile/autosave")
                    .json(patch),
            )
            .await?;
        Ok(envelope.profile)
    }

    async fn bulk_save_enseignements(
        &self,
        items: &[EnseignementInput],
    ) -> ApiResult<Vec<Enseignement>> {
        let body = serde_json::json!({ "enseignements": items });
        let envelope: EnseignementsEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::POST, "/candidat/enseignements/bulk")
                    .json(&body),
            )
            .await?;
        Ok(envelope.enseignements)
    }

    async fn bulk_save_pfes(&self, items: &[PfeInput]) -> ApiResult<Vec<Pfe>> {
        let body = serde_json::json!({ "pfes": items });
        let envelope: PfesEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::POST, "/candidat/pfes/bulk")
                    .json(&body),
            )
            .await?;
        Ok(envelope.pfes)
    }

    async fn bulk_save_activites(
        &self,
        kind: ActiviteType,
        items: &[ActiviteInput],
    ) -> ApiResult<Vec<Activite>> {
        let body = serde_json::json!({ "type": kind, "activites": items });
        let envelope: ActivitesEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::POST, "/candidat/activites/bulk")
                    .json(&body),
            )
            .await?;
        Ok(envelope.activites)
    }

    async fn list_documents(&self, kind: Option<DocumentKind>) -> ApiResult<Vec<Document>> {
        let mut builder = self.transport.request(Method::GET, "/candidat/documents");
        if let Some(kind) = kind {
            builder = builder.query(&[("type", kind.as_str())]);
        }
        let envelope: DocumentsEnvelope = self.transport.execute(builder).await?;
        Ok(envelope.documents)
    }

    async fn upload_document(
        &self,
        kind: DocumentKind,
        upload: DocumentUpload,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Document> {
        validate_upload(&upload.original_name, &upload.mime_type, upload.bytes.len() as u64)?;
        let form = Form::new()
            .text("type", kind.as_str())
            .part("file", progress_part(upload, on_progress)?);
        let envelope: DocumentEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(Method::POST, "/candidat/documents")
                    .multipart(form),
            )
            .await?;
        Ok(envelope.document)
    }

    async fn upload_for_activite(
        &self,
        activite_id: DbId,
        upload: DocumentUpload,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Document> {
        validate_upload(&upload.original_name, &upload.mime_type, upload.bytes.len() as u64)?;
        let form = Form::new().part("file", progress_part(upload, on_progress)?);
        let envelope: DocumentEnvelope = self
            .transport
            .execute(
                self.transport
                    .request(
                        Method::POST,
                        &format!("/candidat/documents/activite/{activite_id}"),
                    )
                    .multipart(form),
            )
            .await?;
        Ok(envelope.document)
    }

    async fn delete_document(&self, id: DbId) -> ApiResult<()> {
        self.transport
            .execute_unit(
                self.transport
                    .request(Method::DELETE, &format!("/candidat/documents/{id}")),
            )
            .await
    }
}

/// Commission-scoped dossier review over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReviewApi {
    transport: Arc<Transport>,
    prefix: &'static str,
}

#[async_trait]
impl ReviewApi for HttpReviewApi {
    async fn list_dossiers(&self, page: u32, per_page: u32) -> ApiResult<Page<DossierSummary>> {
        self.transport
            .execute(
                self.transport
                    .request(Method::GET, &format!("{}/dossiers", self.prefix))
                    .query(&[("page", page), ("per_page", per_page)]),
            )
            .await
    }

    async fn get_dossier(&self, candidature_id: DbId) -> ApiResult<DossierSummary> {
        let envelope: DataEnvelope<DossierSummary> = self
            .transport
            .execute(self.transport.request(
                Method::GET,
                &format!("{}/dossiers/{candidature_id}", self.prefix),
            ))
            .await?;
        Ok(envelope.data)
    }

    async fn list_dossier_documents(
        &self,
        candidature_id: DbId,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<DossierDocument>> {
        self.transport
            .execute(
                self.transport
                    .request(
                        Method::GET,
                        &format!("{}/dossiers/{candidature_id}/documents", self.prefix),
                    )
                    .query(&[("page", page), ("per_page", per_page)]),
            )
            .await
    }

    async fn download_document_bytes(
        &self,
        document_id: DbId,
        cancel: CancellationToken,
    ) -> ApiResult<Vec<u8>> {
        let builder = self.transport.request(
            Method::GET,
            &format!("{}/documents/{document_id}/download", self.prefix),
        );
        self.transport.execute_bytes(builder, cancel).await
    }

    async fn get_notes(&self, candidature_id: DbId) -> ApiResult<Vec<EvaluationNote>> {
        let envelope: DataEnvelope<Vec<EvaluationNote>> = self
            .transport
            .execute(self.transport.request(
                Method::GET,
                &format!("{}/dossiers/{candidature_id}/notes", self.prefix),
            ))
            .await?;
        Ok(envelope.data)
    }

    async fn save_notes(&self, candidature_id: DbId, items: &[EvaluationNote]) -> ApiResult<()> {
        let body = serde_json::json!({ "items": items });
        self.transport
            .execute_unit(
                self.transport
                    .request(
                        Method::PUT,
                        &format!("{}/dossiers/{candidature_id}/notes", self.prefix),
                    )
                    .json(&body),
            )
            .await
    }
}

/// Président-scoped review plus finalization over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPresidentApi {
    review: HttpReviewApi,
}

#[async_trait]
impl ReviewApi for HttpPresidentApi {
    async fn list_dossiers(&self, page: u32, per_page: u32) -> ApiResult<Page<DossierSummary>> {
        self.review.list_dossiers(page, per_page).await
    }

    async fn get_dossier(&self, candidature_id: DbId) -> ApiResult<DossierSummary> {
        self.review.get_dossier(candidature_id).await
    }

    async fn list_dossier_documents(
        &self,
        candidature_id: DbId,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<DossierDocument>> {
        self.review
            .list_dossier_documents(candidature_id, page, per_page)
            .await
    }

    async fn download_document_bytes(
        &self,
        document_id: DbId,
        cancel: CancellationToken,
    ) -> ApiResult<Vec<u8>> {
        self.review.download_document_bytes(document_id, cancel).await
    }

    async fn get_notes(&self, candidature_id: DbId) -> ApiResult<Vec<EvaluationNote>> {
        self.review.get_notes(candidature_id).await
    }

    async fn save_notes(&self, candidature_id: DbId, items: &[EvaluationNote]) -> ApiResult<()> {
        self.review.save_notes(candidature_id, items).await
    }
}

#[async_trait]
impl PresidentApi for HttpPresidentApi {
    async fn get_result(&self, candidature_id: DbId) -> ApiResult<EvaluationResult> {
        let envelope: DataEnvelope<EvaluationResult> = self
            .review
            .transport
            .execute(self.review.transport.request(
                Method::GET,
                &format!("/president/dossiers/{candidature_id}/result"),
            ))
            .await?;
        Ok(envelope.data)
    }

    async fn save_result(&self, candidature_id: DbId, draft: &ResultDraft) -> ApiResult<()> {
        self.review
            .transport
            .execute_unit(
                self.review
                    .transport
                    .request(
                        Method::PUT,
                        &format!("/president/dossiers/{candidature_id}/result"),
                    )
                    .json(draft),
            )
            .await
    }

    async fn validate_final(&self, candidature_id: DbId) -> ApiResult<ValidateFinalResponse> {
        #[derive(Debug, Deserialize)]
        struct ValidateEnvelope {
            message: String,
            data: ValidateData,
        }
        #[derive(Debug, Deserialize)]
        struct ValidateData {
            validated_at: Option<avancement_core::types::Timestamp>,
        }

        let envelope: ValidateEnvelope = self
            .review
            .transport
            .execute(self.review.transport.request(
                Method::POST,
                &format!("/president/dossiers/{candidature_id}/validate"),
            ))
            .await?;
        Ok(ValidateFinalResponse {
            message: envelope.message,
            validated_at: envelope.data.validated_at,
        })
    }
}
