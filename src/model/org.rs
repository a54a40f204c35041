use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organizational team owning one or more repositories. Used only as an
/// enrichment source for metric dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<Uuid>,
    pub name: String,
    /// Lookup key, e.g. the organization login lowercased.
    pub slug: String,
}

impl Team {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// A tracked repository associated with a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRepository {
    pub id: Option<Uuid>,
    /// Full name, e.g. `"acme/api"`.
    pub name: String,
    pub organization: String,
    /// Existing assignments are preserved on re-registration.
    pub team_slug: Option<String>,
}

impl CodeRepository {
    pub fn new(name: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            organization: organization.into(),
            team_slug: None,
        }
    }
}
