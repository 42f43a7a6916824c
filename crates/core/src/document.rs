//! Uploaded document metadata and upload constraints.
//!
//! Documents are created on upload and superseded by delete + re-upload;
//! there is no versioning and no other mutation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum accepted upload size in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted MIME types for justification uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf"];

/// Document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Cv,
    ProfilePdf,
    EnseignementsPdf,
    PfePdf,
    SignedDocument,
    ActiviteJustification,
}

impl DocumentKind {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "cv" => Ok(Self::Cv),
            "profile_pdf" => Ok(Self::ProfilePdf),
            "enseignements_pdf" => Ok(Self::EnseignementsPdf),
            "pfe_pdf" => Ok(Self::PfePdf),
            "signed_document" => Ok(Self::SignedDocument),
            "activite_justification" => Ok(Self::ActiviteJustification),
            _ => Err(CoreError::Validation(format!(
                "Invalid document type '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cv => "cv",
            Self::ProfilePdf => "profile_pdf",
            Self::EnseignementsPdf => "enseignements_pdf",
            Self::PfePdf => "pfe_pdf",
            Self::SignedDocument => "signed_document",
            Self::ActiviteJustification => "activite_justification",
        }
    }
}

/// Metadata for an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DbId,
    pub candidature_id: DbId,
    /// Set when the document justifies one activity entry.
    pub activite_id: Option<DbId>,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

/// Validate an upload before it is sent: PDF only, bounded size, named.
pub fn validate_upload(original_name: &str, mime_type: &str, size: u64) -> Result<(), CoreError> {
    if original_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Le nom du fichier est requis".to_string(),
        ));
    }
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(CoreError::Validation(
            "Seuls les fichiers PDF sont acceptés".to_string(),
        ));
    }
    if size == 0 {
        return Err(CoreError::Validation("Le fichier est vide".to_string()));
    }
    if size > MAX_FILE_SIZE {
        return Err(CoreError::Validation(
            "Le fichier dépasse la taille maximale de 10 Mo".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        for kind in [
            DocumentKind::Cv,
            DocumentKind::ProfilePdf,
            DocumentKind::EnseignementsPdf,
            DocumentKind::PfePdf,
            DocumentKind::SignedDocument,
            DocumentKind::ActiviteJustification,
        ] {
            assert_eq!(DocumentKind::from_str_db(kind.as_str()).unwrap(), kind);
        }
        assert!(DocumentKind::from_str_db("diploma").is_err());
    }

    #[test]
    fn pdf_within_limit_accepted() {
        assert!(validate_upload("cv.pdf", "application/pdf", 1024).is_ok());
        assert!(validate_upload("cv.pdf", "application/pdf", MAX_FILE_SIZE).is_ok());
    }

    #[test]
    fn non_pdf_rejected() {
        assert!(validate_upload("cv.docx", "application/msword", 1024).is_err());
        assert!(validate_upload("photo.png", "image/png", 1024).is_err());
    }

    #[test]
    fn oversized_and_empty_rejected() {
        assert!(validate_upload("cv.pdf", "application/pdf", MAX_FILE_SIZE + 1).is_err());
        assert!(validate_upload("cv.pdf", "application/pdf", 0).is_err());
    }

    #[test]
    fn unnamed_rejected() {
        assert!(validate_upload("  ", "application/pdf", 1024).is_err());
    }
}
