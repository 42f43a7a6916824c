//! Explicit session context.
//!
//! The authenticated user and role are carried as a value passed to every
//! controller rather than read from ambient state, so role gating is
//! decided in exactly one place.

use avancement_core::error::CoreError;
use avancement_core::roles::Role;
use avancement_core::types::DbId;
use serde::{Deserialize, Serialize};

/// The authenticated account, as returned by `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Session context for one signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
}

impl Session {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }

    /// The console path this session lands on after login.
    pub fn landing_path(&self) -> &'static str {
        self.user.role.landing_path()
    }

    /// Gate an operation on the session's role.
    pub fn require_role(&self, role: Role) -> Result<(), CoreError> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Rôle {} requis",
                role.as_str()
            )))
        }
    }
}
