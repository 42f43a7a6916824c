//! Teaching records and the TP-equivalent hour conversion.
//!
//! `equivalent_tp` is a pure function of the hour volume and teaching type.
//! It is always recomputed from those two fields; a stale value carried by a
//! client payload is never trusted.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Conversion factor from CM (lecture) hours to TP-equivalent hours.
pub const FACTOR_CM: f64 = 1.5;

/// Conversion factor from TD (tutorial) hours to TP-equivalent hours.
pub const FACTOR_TD: f64 = 1.25;

/// Conversion factor from TP (practical) hours to TP-equivalent hours.
pub const FACTOR_TP: f64 = 1.0;

/// Teaching type for an enseignement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeEnseignement {
    #[serde(rename = "CM")]
    Cm,
    #[serde(rename = "TD")]
    Td,
    #[serde(rename = "TP")]
    Tp,
}

impl TypeEnseignement {
    /// Parse the backend string form.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "CM" => Ok(Self::Cm),
            "TD" => Ok(Self::Td),
            "TP" => Ok(Self::Tp),
            _ => Err(CoreError::Validation(format!(
                "Invalid teaching type '{s}'. Must be one of: CM, TD, TP"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cm => "CM",
            Self::Td => "TD",
            Self::Tp => "TP",
        }
    }

    /// TP-equivalent conversion factor for this teaching type.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Cm => FACTOR_CM,
            Self::Td => FACTOR_TD,
            Self::Tp => FACTOR_TP,
        }
    }
}

/// Whether the record covers a full module or a module element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeModule {
    #[serde(rename = "Module")]
    Module,
    #[serde(rename = "Element de module")]
    ElementDeModule,
}

/// TP-equivalent hours for a given volume and teaching type.
pub fn equivalent_tp(volume_horaire: f64, kind: TypeEnseignement) -> f64 {
    volume_horaire * kind.factor()
}

/// One teaching record attached to a candidature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enseignement {
    pub id: DbId,
    pub candidature_id: DbId,
    pub annee_universitaire: String,
    pub intitule: String,
    pub type_enseignement: TypeEnseignement,
    pub type_module: TypeModule,
    pub niveau: String,
    pub volume_horaire: f64,
    pub equivalent_tp: f64,
}

/// Fields the candidate supplies for one record; ids and the derived
/// equivalent are assigned server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnseignementInput {
    pub annee_universitaire: String,
    pub intitule: String,
    pub type_enseignement: TypeEnseignement,
    pub type_module: TypeModule,
    pub niveau: String,
    pub volume_horaire: f64,
}

impl EnseignementInput {
    /// Validate the record fields. The derived equivalent is not part of the
    /// input and is recomputed via [`equivalent_tp`].
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_annee_universitaire(&self.annee_universitaire)?;
        if self.intitule.trim().is_empty() {
            return Err(CoreError::Validation(
                "L'intitulé est requis".to_string(),
            ));
        }
        if self.niveau.trim().is_empty() {
            return Err(CoreError::Validation("Le niveau est requis".to_string()));
        }
        if !self.volume_horaire.is_finite() || self.volume_horaire <= 0.0 {
            return Err(CoreError::Validation(
                "Le volume horaire doit être strictement positif".to_string(),
            ));
        }
        Ok(())
    }

    /// The TP-equivalent hours this record contributes.
    pub fn equivalent_tp(&self) -> f64 {
        equivalent_tp(self.volume_horaire, self.type_enseignement)
    }
}

static ANNEE_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^(\d{4})/(\d{4})$").expect("valid regex"));

/// Validate an academic year of the form `AAAA/AAAA` with consecutive years.
pub fn validate_annee_universitaire(value: &str) -> Result<(), CoreError> {
    let caps = ANNEE_PATTERN.captures(value).ok_or_else(|| {
        CoreError::Validation(format!(
            "Année universitaire invalide '{value}'. Format attendu: AAAA/AAAA"
        ))
    })?;
    let start: i32 = caps[1].parse().expect("matched digits");
    let end: i32 = caps[2].parse().expect("matched digits");
    if end != start + 1 {
        return Err(CoreError::Validation(format!(
            "Année universitaire invalide '{value}'. Les années doivent être consécutives"
        )));
    }
    Ok(())
}

/// Aggregate totals over a set of teaching records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EnseignementTotals {
    pub volume_horaire: f64,
    pub equivalent_tp: f64,
    pub count: usize,
}

/// Totals over the full record set.
pub fn totals(records: &[Enseignement]) -> EnseignementTotals {
    EnseignementTotals {
        volume_horaire: records.iter().map(|e| e.volume_horaire).sum(),
        equivalent_tp: records.iter().map(|e| e.equivalent_tp).sum(),
        count: records.len(),
    }
}

/// Group records by academic year, each group carrying its own totals.
pub fn by_year(records: &[Enseignement]) -> BTreeMap<String, EnseignementTotals> {
    let mut grouped: BTreeMap<String, EnseignementTotals> = BTreeMap::new();
    for record in records {
        let entry = grouped
            .entry(record.annee_universitaire.clone())
            .or_default();
        entry.volume_horaire += record.volume_horaire;
        entry.equivalent_tp += record.equivalent_tp;
        entry.count += 1;
    }
    grouped
}
