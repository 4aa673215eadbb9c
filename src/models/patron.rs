//! Patron model and roles

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Patron roles. The role drives the loan limit and loan duration table
/// in the business rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Librarian,
    Admin,
}

impl Role {
    /// Librarians and admins may act on loans they do not own
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Student => "student",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        };
        write!(f, "{}", label)
    }
}

/// A registered patron. Owned by the external user directory; the core
/// reads identity, role and the active flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Patron {
    pub id: i64,
    /// Registration code issued by the directory
    pub matricule: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Seed data for registering a patron with the store
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPatron {
    pub matricule: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}
