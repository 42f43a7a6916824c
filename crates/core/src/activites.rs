//! Activity records (teaching and research) and their fixed category
//! catalogs.
//!
//! Catalogs must match the backend's validation tables. An activity entry
//! counts toward step completion only once a justification document is
//! attached to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::CoreError;
use crate::types::DbId;

/// Which wizard step an activity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiviteType {
    Enseignement,
    Recherche,
}

impl ActiviteType {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "enseignement" => Ok(Self::Enseignement),
            "recherche" => Ok(Self::Recherche),
            _ => Err(CoreError::Validation(format!(
                "Invalid activity type '{s}'. Must be one of: enseignement, recherche"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enseignement => "enseignement",
            Self::Recherche => "recherche",
        }
    }
}

/// Teaching-activity catalog: category code, title, subcategories.
pub const ENSEIGNEMENT_CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "A/1",
        "A/1 - Enseignement et production pédagogique",
        &[
            "Conception et montage d'une filière accréditée comme coordonnateur",
            "Coordination d'une filière accréditée ou d'un établissement",
            "Préparation de cours ou TD ou TP d'un module nouveaux",
            "Préparation de supports et polycopiés de cours ou TD ou TP",
            "Participation aux travaux des jurys au niveau national",
            "Responsable d'un module",
        ],
    ),
    (
        "A/2",
        "A/2 - Encadrement pédagogique",
        &[
            "Encadrement de PFE Licence, Master, Ingénieur",
            "Encadrement de stages et visites de terrain",
            "Formation de formateurs et personnel",
        ],
    ),
    (
        "A/3",
        "A/3 - Responsabilités pédagogiques",
        &[
            "Tutorat d'étudiants (PFE, stages...)",
            "Organisation de manifestations scientifiques ou pédagogiques",
            "Participation active aux travaux des commissions pédagogiques",
        ],
    ),
];

/// Research-activity catalog: category code, title, subcategories.
pub const RECHERCHE_CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "B/1",
        "B/1 - Production scientifique",
        &[
            "Publication dans une revue indexée",
            "Brevet déposé ou exploité",
            "Direction de thèse soutenue",
            "Co-direction de thèse soutenue",
        ],
    ),
    (
        "B/2",
        "B/2 - Encadrement scientifique",
        &[
            "Publication dans les actes de congrès indexés",
            "Publication dans une revue spécialisée non indexée",
            "Direction de thèses en cours d'un doctorant inscrit",
        ],
    ),
    (
        "B/3",
        "B/3 - Responsabilités scientifiques",
        &[
            "Participation à des projets de recherche financés (CNRST, International...)",
            "Création ou participation à la création d'une structure de recherche accréditée",
            "Communication orale ou poster dans un congrès",
        ],
    ),
    (
        "B/4",
        "B/4 - Rayonnement, innovation et valorisation",
        &[
            "Responsabilité de structure de recherche accréditée comme directeur",
            "Responsabilité de structure de recherche accréditée comme chef d'équipe",
            "Rédaction de rapports d'expertise ou de rapports techniques",
            "Évaluation d'articles scientifiques (reviewer)",
        ],
    ),
];

/// Catalog for the given activity type.
pub fn categories(kind: ActiviteType) -> &'static [(&'static str, &'static str, &'static [&'static str])] {
    match kind {
        ActiviteType::Enseignement => ENSEIGNEMENT_CATEGORIES,
        ActiviteType::Recherche => RECHERCHE_CATEGORIES,
    }
}

/// Whether `(category, subcategory)` exists in the catalog for `kind`.
pub fn is_known_entry(kind: ActiviteType, category: &str, subcategory: &str) -> bool {
    categories(kind)
        .iter()
        .any(|(code, _, subs)| *code == category && subs.contains(&subcategory))
}

/// One activity entry attached to a candidature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activite {
    pub id: DbId,
    pub candidature_id: DbId,
    #[serde(rename = "type")]
    pub kind: ActiviteType,
    pub category: String,
    pub subcategory: String,
    pub count: u32,
    pub document: Option<Document>,
}

impl Activite {
    /// Valid for step completion only once a justification is attached.
    pub fn has_required_document(&self) -> bool {
        self.document.is_some()
    }
}

/// Candidate-supplied fields for one activity entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiviteInput {
    pub category: String,
    pub subcategory: String,
    pub count: u32,
}

impl ActiviteInput {
    pub fn validate(&self, kind: ActiviteType) -> Result<(), CoreError> {
        if !is_known_entry(kind, &self.category, &self.subcategory) {
            return Err(CoreError::Validation(format!(
                "Activité inconnue: '{}' / '{}'",
                self.category, self.subcategory
            )));
        }
        if self.count == 0 {
            return Err(CoreError::Validation(
                "Le nombre doit être au moins 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-category rollup of activity entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryGroup {
    pub total_count: u32,
    pub entries: usize,
    pub has_all_documents: bool,
}

/// Group activity entries by category code.
pub fn by_category(records: &[Activite]) -> BTreeMap<String, CategoryGroup> {
    let mut grouped: BTreeMap<String, CategoryGroup> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.category.clone()).or_insert(CategoryGroup {
            total_count: 0,
            entries: 0,
            has_all_documents: true,
        });
        entry.total_count += record.count;
        entry.entries += 1;
        entry.has_all_documents &= record.has_required_document();
    }
    grouped
}
