//! Role enumeration and role-to-landing-path mapping.
//!
//! The backend serializes roles as French display strings; the variants here
//! round-trip those exactly. Unknown role strings are rejected rather than
//! defaulted, so a misconfigured account cannot land on another role's pages.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The five account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Candidat")]
    Candidat,
    #[serde(rename = "Système")]
    Systeme,
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Commission")]
    Commission,
    #[serde(rename = "Président")]
    President,
}

impl Role {
    /// Parse a role string as returned by the backend.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "Candidat" => Ok(Self::Candidat),
            "Système" => Ok(Self::Systeme),
            "Admin" => Ok(Self::Admin),
            "Commission" => Ok(Self::Commission),
            "Président" => Ok(Self::President),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: Candidat, Système, Admin, Commission, Président"
            ))),
        }
    }

    /// Convert to the backend string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidat => "Candidat",
            Self::Systeme => "Système",
            Self::Admin => "Admin",
            Self::Commission => "Commission",
            Self::President => "Président",
        }
    }

    /// Landing path for the role's console after login.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Self::Candidat => "/candidat",
            Self::Systeme => "/systeme",
            Self::Admin => "/admin",
            Self::Commission => "/commission",
            Self::President => "/president",
        }
    }
}
