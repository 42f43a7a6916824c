//! Candidate profile: the first wizard step.
//!
//! All listed fields are mandatory before the step is complete, except
//! `date_recrutement_fp` which may stay null. The partial autosave payload
//! tolerates any subset of fields and never fails completeness checks.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// Profile record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: DbId,
    pub candidature_id: DbId,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: String,
    pub etablissement: String,
    pub ville: String,
    pub departement: String,
    pub grade_actuel: String,
    pub date_recrutement_es: String,
    pub date_recrutement_fp: Option<String>,
    pub numero_som: Option<String>,
    pub telephone: String,
    pub specialite: String,
    pub is_complete: bool,
}

/// The candidate-editable profile fields, used for the full save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, message = "Le nom est requis"))]
    pub nom: String,
    #[validate(length(min = 1, message = "Le prénom est requis"))]
    pub prenom: String,
    #[validate(length(min = 1, message = "La date de naissance est requise"))]
    pub date_naissance: String,
    #[validate(length(min = 1, message = "L'établissement est requis"))]
    pub etablissement: String,
    #[validate(length(min = 1, message = "La ville est requise"))]
    pub ville: String,
    #[validate(length(min = 1, message = "Le département est requis"))]
    pub departement: String,
    #[validate(length(min = 1, message = "Le grade est requis"))]
    pub grade_actuel: String,
    #[validate(length(min = 1, message = "La date de recrutement est requise"))]
    pub date_recrutement_es: String,
    /// Optional: recruitment into the civil service may predate the record.
    pub date_recrutement_fp: Option<String>,
    #[validate(length(min = 1, message = "Le numéro SOM est requis"))]
    pub numero_som: String,
    #[validate(length(min = 1, message = "Le téléphone est requis"))]
    pub telephone: String,
    #[validate(length(min = 1, message = "La spécialité est requise"))]
    pub specialite: String,
}

impl ProfileForm {
    /// Validate the full save; the first failing field's message is surfaced.
    pub fn validate_complete(&self) -> Result<(), CoreError> {
        match self.missing_fields().first() {
            None => Ok(()),
            Some((_, message)) => Err(CoreError::Validation((*message).to_string())),
        }
    }

    /// `(field, message)` pairs for every mandatory field still empty, in
    /// form order.
    pub fn missing_fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        let checks: [(&'static str, &str, &'static str); 11] = [
            ("nom", &self.nom, "Le nom est requis"),
            ("prenom", &self.prenom, "Le prénom est requis"),
            (
                "date_naissance",
                &self.date_naissance,
                "La date de naissance est requise",
            ),
            (
                "etablissement",
                &self.etablissement,
                "L'établissement est requis",
            ),
            ("ville", &self.ville, "La ville est requise"),
            ("departement", &self.departement, "Le département est requis"),
            ("grade_actuel", &self.grade_actuel, "Le grade est requis"),
            (
                "date_recrutement_es",
                &self.date_recrutement_es,
                "La date de recrutement est requise",
            ),
            ("numero_som", &self.numero_som, "Le numéro SOM est requis"),
            ("telephone", &self.telephone, "Le téléphone est requis"),
            ("specialite", &self.specialite, "La spécialité est requise"),
        ];
        for (field, value, message) in checks {
            if value.trim().is_empty() {
                missing.push((field, message));
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Partial autosave payload: any subset of fields. Omitted fields are left
/// untouched server-side; no completeness validation applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etablissement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ville: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_actuel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_recrutement_es: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_recrutement_fp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_som: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialite: Option<String>,
}

impl ProfilePatch {
    /// True when the patch carries nothing; an empty autosave is skipped.
    pub fn is_empty(&self) -> bool {
        self.nom.is_none()
            && self.prenom.is_none()
            && self.date_naissance.is_none()
            && self.etablissement.is_none()
            && self.ville.is_none()
            && self.departement.is_none()
            && self.grade_actuel.is_none()
            && self.date_recrutement_es.is_none()
            && self.date_recrutement_fp.is_none()
            && self.numero_som.is_none()
            && self.telephone.is_none()
            && self.specialite.is_none()
    }
}

impl From<&ProfileForm> for ProfilePatch {
    /// Autosave snapshot of the current form: only non-empty fields are
    /// carried, so a half-filled form never blanks server values.
    fn from(form: &ProfileForm) -> Self {
        fn keep(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Self {
            nom: keep(&form.nom),
            prenom: keep(&form.prenom),
            date_naissance: keep(&form.date_naissance),
            etablissement: keep(&form.etablissement),
            ville: keep(&form.ville),
            departement: keep(&form.departement),
            grade_actuel: keep(&form.grade_actuel),
            date_recrutement_es: keep(&form.date_recrutement_es),
            date_recrutement_fp: form.date_recrutement_fp.as_deref().and_then(keep),
            numero_som: keep(&form.numero_som),
            telephone: keep(&form.telephone),
            specialite: keep(&form.specialite),
        }
    }
}
