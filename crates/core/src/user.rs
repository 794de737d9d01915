//! User profiles for the tutor/curator directory.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Curator,
    Tutor,
    Student,
}

impl UserRole {
    /// Roles that may be assigned to supervise a project or case.
    pub fn can_supervise(self) -> bool {
        matches!(self, UserRole::Curator | UserRole::Tutor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    pub full_name: String,
    pub role: UserRole,
    pub telegram: Option<String>,
}

impl Record for UserProfile {
    fn id(&self) -> EntityId {
        self.id
    }
}
