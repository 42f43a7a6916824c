//! Supervised final-year project (PFE) records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enseignement::validate_annee_universitaire;
use crate::error::CoreError;
use crate::types::DbId;

/// Degree level of a supervised project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PfeNiveau {
    #[serde(rename = "DUT")]
    Dut,
    #[serde(rename = "Licence")]
    Licence,
    #[serde(rename = "Master")]
    Master,
    #[serde(rename = "Ingénieur")]
    Ingenieur,
    #[serde(rename = "Doctorat")]
    Doctorat,
    #[serde(rename = "Autre")]
    Autre,
}

impl PfeNiveau {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "DUT" => Ok(Self::Dut),
            "Licence" => Ok(Self::Licence),
            "Master" => Ok(Self::Master),
            "Ingénieur" => Ok(Self::Ingenieur),
            "Doctorat" => Ok(Self::Doctorat),
            "Autre" => Ok(Self::Autre),
            _ => Err(CoreError::Validation(format!(
                "Invalid PFE level '{s}'. Must be one of: DUT, Licence, Master, Ingénieur, Doctorat, Autre"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dut => "DUT",
            Self::Licence => "Licence",
            Self::Master => "Master",
            Self::Ingenieur => "Ingénieur",
            Self::Doctorat => "Doctorat",
            Self::Autre => "Autre",
        }
    }
}

/// One supervised project record attached to a candidature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pfe {
    pub id: DbId,
    pub candidature_id: DbId,
    pub annee_universitaire: String,
    pub intitule: String,
    pub niveau: PfeNiveau,
    pub volume_horaire: f64,
}

/// Candidate-supplied fields for one project record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PfeInput {
    pub annee_universitaire: String,
    pub intitule: String,
    pub niveau: PfeNiveau,
    pub volume_horaire: f64,
}

impl PfeInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_annee_universitaire(&self.annee_universitaire)?;
        if self.intitule.trim().is_empty() {
            return Err(CoreError::Validation("L'intitulé est requis".to_string()));
        }
        if !self.volume_horaire.is_finite() || self.volume_horaire < 0.0 {
            return Err(CoreError::Validation(
                "Le volume horaire doit être positif".to_string(),
            ));
        }
        Ok(())
    }
}

/// Aggregate totals over a set of project records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PfeTotals {
    pub volume_horaire: f64,
    pub count: usize,
}

pub fn totals(records: &[Pfe]) -> PfeTotals {
    PfeTotals {
        volume_horaire: records.iter().map(|p| p.volume_horaire).sum(),
        count: records.len(),
    }
}

/// Group records by degree level with per-level totals.
pub fn by_niveau(records: &[Pfe]) -> BTreeMap<PfeNiveau, PfeTotals> {
    let mut grouped: BTreeMap<PfeNiveau, PfeTotals> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.niveau).or_default();
        entry.volume_horaire += record.volume_horaire;
        entry.count += 1;
    }
    grouped
}
