// Organizational enrichment: teams and tracked repositories

use crate::errors::Result;
use crate::model::{CodeRepository, Team};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Collaborator contract for the repository/team side effect in metric
/// calculation. Implementations must make find-or-create idempotent under
/// concurrent callers (uniqueness at the storage boundary).
#[async_trait]
pub trait RepositoryRegistrar: Send + Sync {
    async fn find_repository(&self, name: &str) -> Result<Option<CodeRepository>>;
    async fn save_repository(&self, repo: CodeRepository) -> Result<CodeRepository>;
    async fn find_team(&self, slug: &str) -> Result<Option<Team>>;
    async fn save_team(&self, team: Team) -> Result<Team>;
}

/// In-memory registrar. A single mutex spans lookup and insert, so two
/// concurrent registrations of the same slug converge on one row — the
/// upsert semantics the SQLite variant gets from a UNIQUE constraint.
#[derive(Debug, Default)]
pub struct MemoryRegistrar {
    inner: Arc<Mutex<RegistrarRows>>,
}

#[derive(Debug, Default)]
struct RegistrarRows {
    teams: HashMap<String, Team>,
    repositories: HashMap<String, CodeRepository>,
}

impl MemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryRegistrar for MemoryRegistrar {
    async fn find_repository(&self, name: &str) -> Result<Option<CodeRepository>> {
        let rows = self.inner.lock().await;
        Ok(rows.repositories.get(name).cloned())
    }

    async fn save_repository(&self, mut repo: CodeRepository) -> Result<CodeRepository> {
        let mut rows = self.inner.lock().await;
        if let Some(existing) = rows.repositories.get(&repo.name) {
            repo.id = existing.id;
            // Re-registration never steals an existing team assignment.
            if repo.team_slug.is_none() {
                repo.team_slug = existing.team_slug.clone();
            }
        } else if repo.id.is_none() {
            repo.id = Some(Uuid::new_v4());
        }
        rows.repositories.insert(repo.name.clone(), repo.clone());
        Ok(repo)
    }

    async fn find_team(&self, slug: &str) -> Result<Option<Team>> {
        let rows = self.inner.lock().await;
        Ok(rows.teams.get(slug).cloned())
    }

    async fn save_team(&self, mut team: Team) -> Result<Team> {
        let mut rows = self.inner.lock().await;
        if let Some(existing) = rows.teams.get(&team.slug) {
            team.id = existing.id;
        } else if team.id.is_none() {
            team.id = Some(Uuid::new_v4());
        }
        rows.teams.insert(team.slug.clone(), team.clone());
        Ok(team)
    }
}
