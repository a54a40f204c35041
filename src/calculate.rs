// Event -> metric calculation pipeline: resolve, classify, enrich,
// register, persist, cache.

use crate::cache::Cache;
use crate::classify::MetricClassifier;
use crate::errors::{DevPulseError, Result};
use crate::model::{CodeRepository, Event, Metric, Team};
use crate::registrar::RepositoryRegistrar;
use crate::store::{EventStore, MetricStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const METRIC_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Everything one calculation produced. `warnings` carries the soft
/// failures (enrichment, cache) that were logged and swallowed, so callers
/// and tests can assert on degraded-but-successful outcomes.
#[derive(Debug)]
pub struct CalculationOutcome {
    pub metrics: Vec<Metric>,
    pub warnings: Vec<String>,
}

/// Orchestrates metric derivation for one stored event. Invoked from the
/// ingestion queue after the event is known to exist, which is why a
/// missing event is a hard `NotFound` rather than a silent skip.
pub struct MetricCalculationService {
    events: Arc<dyn EventStore>,
    metrics: Arc<dyn MetricStore>,
    classifier: MetricClassifier,
    registrar: Option<Arc<dyn RepositoryRegistrar>>,
    cache: Option<Arc<dyn Cache>>,
}

impl MetricCalculationService {
    pub fn new(
        events: Arc<dyn EventStore>,
        metrics: Arc<dyn MetricStore>,
        classifier: MetricClassifier,
    ) -> Self {
        Self {
            events,
            metrics,
            classifier,
            registrar: None,
            cache: None,
        }
    }

    pub fn with_registrar(mut self, registrar: Arc<dyn RepositoryRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn call(&self, event_id: Uuid) -> Result<CalculationOutcome> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DevPulseError::not_found("event", event_id.to_string()))?;

        let mut definitions = self.classifier.classify(&event);
        let mut warnings = Vec::new();

        // Backfill repository/organization onto every definition that lacks
        // them, so all metrics from one event share a consistent tag even
        // when an individual rule forgot to set it.
        let repository = definitions
            .iter()
            .find_map(|d| d.dimensions.get_str("repository").map(str::to_string))
            .or_else(|| extract_repository(&event));

        if let Some(repository) = &repository {
            let organization = organization_of(repository);
            for definition in &mut definitions {
                if !definition.dimensions.contains_key("repository") {
                    definition.dimensions.insert("repository", repository.clone());
                }
                if let Some(org) = &organization {
                    if !definition.dimensions.contains_key("organization") {
                        definition.dimensions.insert("organization", org.clone());
                    }
                }
            }

            if let Some(registrar) = &self.registrar {
                if let Err(err) = self
                    .register_repository(registrar.as_ref(), repository, organization.as_deref())
                    .await
                {
                    warn!(
                        repository = repository.as_str(),
                        error = %err,
                        "Repository registration failed; continuing with metric persistence"
                    );
                    warnings.push(format!("repository registration failed: {err}"));
                }
            }
        }

        let timestamp = event.timestamp.unwrap_or_else(chrono::Utc::now);
        let mut persisted = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let metric = definition.into_metric(&event.source, timestamp);
            let saved = self.metrics.save(metric).await?;
            let id = saved
                .id
                .ok_or_else(|| DevPulseError::Validation("metric persisted without an id".into()))?;

            if let Some(cache) = &self.cache {
                let key = format!("metric:{id}");
                match serde_json::to_string(&saved) {
                    Ok(body) => {
                        if let Err(err) = cache.write(&key, body, METRIC_CACHE_TTL).await {
                            warn!(metric.id = %id, error = %err, "Metric cache write failed");
                            warnings.push(format!("cache write failed for {id}: {err}"));
                        }
                    }
                    Err(err) => {
                        warnings.push(format!("cache serialization failed for {id}: {err}"));
                    }
                }
            }
            persisted.push(saved);
        }

        info!(
            event.id = %event_id,
            event.name = event.name.as_str(),
            metrics.count = persisted.len(),
            warnings.count = warnings.len(),
            "Metric calculation completed"
        );

        Ok(CalculationOutcome {
            metrics: persisted,
            warnings,
        })
    }

    /// Best-effort team/repository registration. Existing team assignments
    /// on a repository are never overwritten.
    async fn register_repository(
        &self,
        registrar: &dyn RepositoryRegistrar,
        repository: &str,
        organization: Option<&str>,
    ) -> Result<()> {
        let team_slug = match organization {
            Some(org) => {
                let slug = org.to_lowercase();
                if registrar
                    .find_team(&slug)
                    .await
                    .map_err(|e| DevPulseError::Enrichment(e.to_string()))?
                    .is_none()
                {
                    registrar
                        .save_team(Team::new(org, slug.clone()))
                        .await
                        .map_err(|e| DevPulseError::Enrichment(e.to_string()))?;
                }
                Some(slug)
            }
            None => None,
        };

        let existing = registrar
            .find_repository(repository)
            .await
            .map_err(|e| DevPulseError::Enrichment(e.to_string()))?;

        let mut repo = existing.unwrap_or_else(|| {
            CodeRepository::new(repository, organization.unwrap_or_default())
        });
        if repo.team_slug.is_none() {
            repo.team_slug = team_slug;
        }
        registrar
            .save_repository(repo)
            .await
            .map_err(|e| DevPulseError::Enrichment(e.to_string()))?;
        Ok(())
    }
}

fn extract_repository(event: &Event) -> Option<String> {
    event
        .data_str("repository.full_name")
        .or_else(|| event.data_str("repository.name"))
        .map(str::to_string)
}

fn organization_of(repository: &str) -> Option<String> {
    repository
        .split_once('/')
        .map(|(org, _)| org.to_string())
        .filter(|org| !org.is_empty())
}
