// Read-side dashboard reports composed from metric queries

pub mod builds;
pub mod commits;
pub mod reports;
pub mod velocity;

pub use builds::{BuildPerformanceReport, FlakyJob, WorkflowStats};
pub use commits::{AuthorActivity, CommitActivityReport, DailyCount, HotspotEntry};
pub use velocity::{TeamVelocityReport, WeeklyClosure};

use crate::cache::{report_key, Cache};
use crate::dora::{DateRange, DoraDashboard, DoraEngine};
use crate::store::MetricStore;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const REPORT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Dashboard-facing report facade. Every method returns a structurally
/// complete result; missing data zeroes fields instead of dropping them.
/// Caching is advisory — a broken cache only costs latency.
pub struct AnalyticsService {
    store: Arc<dyn MetricStore>,
    dora: DoraEngine,
    cache: Option<Arc<dyn Cache>>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        let dora = DoraEngine::new(store.clone());
        Self {
            store,
            dora,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn dora(&self) -> &DoraEngine {
        &self.dora
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        match cache.read(key).await {
            Ok(Some(body)) => match serde_json::from_str(&body) {
                Ok(report) => Some(report),
                Err(err) => {
                    warn!(cache.key = key, error = %err, "Corrupt cache entry ignored");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(cache.key = key, error = %err, "Cache read failed; querying store");
                None
            }
        }
    }

    async fn store_cached<T: Serialize>(&self, key: &str, report: &T) {
        let Some(cache) = &self.cache else { return };
        match serde_json::to_string(report) {
            Ok(body) => {
                if let Err(err) = cache.write(key, body, REPORT_CACHE_TTL).await {
                    warn!(cache.key = key, error = %err, "Cache write failed");
                }
            }
            Err(err) => warn!(cache.key = key, error = %err, "Cache serialization failed"),
        }
    }

    fn key(report: &str, window: &DateRange, repository: Option<&str>) -> String {
        let days = format!("days_{}", window.days().round() as u64);
        match repository {
            Some(repo) => {
                let repo = format!("repo_{repo}");
                report_key(report, &[days.as_str(), repo.as_str()])
            }
            None => report_key(report, &[days.as_str()]),
        }
    }

    pub async fn commit_activity(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> CommitActivityReport {
        let key = Self::key("commit_activity", window, repository);
        if let Some(report) = self.cached(&key).await {
            return report;
        }
        let report = commits::calculate(self.store.as_ref(), window, repository).await;
        self.store_cached(&key, &report).await;
        report
    }

    pub async fn team_velocity(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> TeamVelocityReport {
        let key = Self::key("team_velocity", window, repository);
        if let Some(report) = self.cached(&key).await {
            return report;
        }
        let report = velocity::calculate(self.store.as_ref(), window, repository).await;
        self.store_cached(&key, &report).await;
        report
    }

    pub async fn build_performance(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> BuildPerformanceReport {
        let key = Self::key("build_performance", window, repository);
        if let Some(report) = self.cached(&key).await {
            return report;
        }
        let report = builds::calculate(self.store.as_ref(), window, repository).await;
        self.store_cached(&key, &report).await;
        report
    }

    pub async fn dora_dashboard(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> DoraDashboard {
        let key = Self::key("dora", window, repository);
        if let Some(report) = self.cached(&key).await {
            return report;
        }
        let report = self.dora.dashboard(window, repository).await;
        self.store_cached(&key, &report).await;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::model::{Dimensions, Metric};
    use crate::store::MemoryMetricStore;
    use chrono::{Duration as ChronoDuration, Utc};

    #[tokio::test]
    async fn cached_report_is_served_without_requerying() {
        let store = Arc::new(MemoryMetricStore::new());
        let cache = Arc::new(MemoryCache::default());
        let service = AnalyticsService::new(store.clone()).with_cache(cache);
        let window = DateRange::last_days(7);

        let empty = service.build_performance(&window, Some("acme/api")).await;
        assert_eq!(empty.total_runs, 0);

        // New data lands after the first read; the cached (empty) report
        // keeps being served until the TTL lapses.
        store
            .save(Metric::new(
                "github.workflow_job.completed",
                1.0,
                "github",
                Dimensions::new()
                    .set("repository", "acme/api")
                    .set("conclusion", "success"),
                Utc::now() - ChronoDuration::hours(1),
            ))
            .await
            .unwrap();

        let cached = service.build_performance(&window, Some("acme/api")).await;
        assert_eq!(cached.total_runs, 0);
    }

    #[tokio::test]
    async fn uncached_service_always_queries_the_store() {
        let store = Arc::new(MemoryMetricStore::new());
        let service = AnalyticsService::new(store.clone());
        let window = DateRange::last_days(7);

        store
            .save(Metric::new(
                "github.workflow_job.completed",
                1.0,
                "github",
                Dimensions::new().set("conclusion", "success"),
                Utc::now() - ChronoDuration::hours(1),
            ))
            .await
            .unwrap();

        let report = service.build_performance(&window, None).await;
        assert_eq!(report.total_runs, 1);
    }
}
